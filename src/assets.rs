use crate::cli::AssetsArgs;
use crate::config::ViewerConfig;

const COVER_STEM: &str = "cover";

/// Maps `(volume, page)` to an image path under the asset root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLayout {
    root: String,
    extension: String,
}

impl AssetLayout {
    pub fn new(root: impl Into<String>, extension: impl Into<String>) -> Self {
        let root = root.into();
        let extension = extension.into();
        Self {
            root: root.trim_end_matches('/').to_owned(),
            extension: extension.trim_start_matches('.').to_owned(),
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(&config.asset_root, &config.image_extension)
    }

    pub fn volume_dir(&self, volume: u32) -> String {
        let mut path = String::new();
        if !self.root.is_empty() {
            path.push_str(&self.root);
            path.push('/');
        }
        path.push_str(&format!("pages/chapter-{volume:02}"));
        path
    }

    /// Page `0` is the cover, which lives under a fixed file name.
    pub fn page_image(&self, volume: u32, page: u32) -> String {
        let dir = self.volume_dir(volume);
        if page == 0 {
            format!("{dir}/{COVER_STEM}.{}", self.extension)
        } else {
            format!("{dir}/{page:03}.{}", self.extension)
        }
    }
}

impl Default for AssetLayout {
    fn default() -> Self {
        Self::new("assets", "jpg")
    }
}

/// Prints every page image path (cover first) of the selected volumes.
pub async fn run(args: AssetsArgs) -> anyhow::Result<()> {
    let config = args.layout.config()?;
    let layout = AssetLayout::from_config(&config);
    let manifest = crate::manifest::load(&args.manifest).await?;

    let volumes: Vec<_> = match args.volume {
        Some(number) => {
            let volume = manifest
                .volume(number)
                .ok_or_else(|| anyhow::anyhow!("volume not found in manifest: {number}"))?;
            vec![volume]
        }
        None => manifest.volumes.iter().collect(),
    };

    for volume in volumes {
        for page in 0..=volume.page_count {
            println!("{}", layout.page_image(volume.number, page));
        }
    }
    Ok(())
}
