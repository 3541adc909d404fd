use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use url::Url;

use crate::formats::Manifest;

/// Loads the content manifest from a local path or an http(s) URL.
pub async fn load(source: &str) -> anyhow::Result<Manifest> {
    let bytes = match Url::parse(source) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => fetch(&url).await?,
        _ => tokio::fs::read(Path::new(source))
            .await
            .with_context(|| format!("read manifest: {source}"))?,
    };

    let manifest = parse(&bytes).with_context(|| format!("parse manifest: {source}"))?;
    tracing::info!(
        source,
        volumes = manifest.volumes.len(),
        artworks = manifest.concept_art.len(),
        "loaded manifest"
    );
    Ok(manifest)
}

/// Same as [`load`], but a failure leaves the viewer without content instead of
/// aborting startup.
pub async fn load_or_unavailable(source: &str) -> Option<Manifest> {
    match load(source).await {
        Ok(manifest) => Some(manifest),
        Err(err) => {
            tracing::warn!(source, ?err, "manifest unavailable");
            None
        }
    }
}

pub fn parse(bytes: &[u8]) -> anyhow::Result<Manifest> {
    let manifest: Manifest = serde_json::from_slice(bytes).context("deserialize manifest")?;
    Ok(sanitize(manifest))
}

async fn fetch(url: &Url) -> anyhow::Result<Vec<u8>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("build manifest http client")?;

    let resp = client
        .get(url.clone())
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .with_context(|| format!("GET {url}"))?;

    let status = resp.status();
    if !status.is_success() {
        anyhow::bail!("manifest request failed ({status}): {url}");
    }

    let bytes = resp.bytes().await.context("read manifest body")?;
    Ok(bytes.to_vec())
}

// Volumes need a positive number that no earlier volume uses, and at least one page.
fn sanitize(mut manifest: Manifest) -> Manifest {
    let mut seen = HashSet::new();
    manifest.volumes.retain(|volume| {
        if volume.number == 0 || volume.page_count == 0 {
            tracing::warn!(
                number = volume.number,
                pages = volume.page_count,
                "dropping volume with zero number or page count"
            );
            return false;
        }
        if !seen.insert(volume.number) {
            tracing::warn!(number = volume.number, "dropping duplicate volume number");
            return false;
        }
        true
    });
    manifest
}
