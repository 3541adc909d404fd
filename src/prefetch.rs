use std::time::Duration;

use anyhow::Context as _;
use url::Url;

/// Warms the cache for an image the user is likely to see next. No completion is
/// reported back; a failed prefetch only means the next navigation pays full latency.
pub trait AssetLoader {
    fn prefetch(&mut self, src: &str);
}

#[derive(Debug, Clone, Default)]
pub struct NoopLoader;

impl AssetLoader for NoopLoader {
    fn prefetch(&mut self, src: &str) {
        tracing::trace!(src, "prefetch skipped");
    }
}

/// Issues a detached GET per prefetch on the current tokio runtime.
#[derive(Debug, Clone)]
pub struct HttpPrefetcher {
    client: reqwest::Client,
    base: Url,
    runtime: tokio::runtime::Handle,
}

impl HttpPrefetcher {
    /// Must be called from within a tokio runtime.
    pub fn new(base: &str) -> anyhow::Result<Self> {
        let mut base = Url::parse(base).with_context(|| format!("parse prefetch base: {base}"))?;
        if base.scheme() != "http" && base.scheme() != "https" {
            anyhow::bail!("prefetch base must be http/https: {base}");
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("build prefetch http client")?;
        let runtime =
            tokio::runtime::Handle::try_current().context("prefetch needs a tokio runtime")?;

        Ok(Self {
            client,
            base,
            runtime,
        })
    }

    pub fn resolve(&self, src: &str) -> anyhow::Result<Url> {
        self.base
            .join(src)
            .with_context(|| format!("resolve asset: {src}"))
    }
}

impl AssetLoader for HttpPrefetcher {
    fn prefetch(&mut self, src: &str) {
        let url = match self.resolve(src) {
            Ok(url) => url,
            Err(err) => {
                tracing::debug!(src, ?err, "prefetch skipped");
                return;
            }
        };

        let client = self.client.clone();
        self.runtime.spawn(async move {
            match client.get(url.clone()).send().await {
                Ok(resp) if resp.status().is_success() => {
                    let _ = resp.bytes().await;
                    tracing::debug!(%url, "prefetched");
                }
                Ok(resp) => tracing::debug!(%url, status = %resp.status(), "prefetch failed"),
                Err(err) => tracing::debug!(%url, ?err, "prefetch failed"),
            }
        });
    }
}
