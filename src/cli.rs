use clap::{Args, Parser, Subcommand};

use crate::config::ViewerConfig;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Route(RouteArgs),
    Assets(AssetsArgs),
    Replay(ReplayArgs),
    Progress(ProgressArgs),
}

#[derive(Debug, Args)]
pub struct RouteArgs {
    /// Location fragment (`#/read/2/3`) or full location URL.
    pub location: String,
}

#[derive(Debug, Args, Default)]
pub struct LayoutArgs {
    /// Asset root prefix (default: $PAGETURN_ASSET_ROOT or `assets`).
    #[arg(long)]
    pub asset_root: Option<String>,

    /// Page image extension (default: $PAGETURN_IMAGE_EXT or `jpg`).
    #[arg(long)]
    pub image_ext: Option<String>,
}

impl LayoutArgs {
    pub fn config(&self) -> anyhow::Result<ViewerConfig> {
        let mut config = ViewerConfig::from_env()?;
        if let Some(root) = &self.asset_root {
            config.asset_root = root.clone();
        }
        if let Some(ext) = &self.image_ext {
            config.image_extension = ext.clone();
        }
        Ok(config)
    }
}

#[derive(Debug, Args)]
pub struct AssetsArgs {
    /// Manifest path or http(s) URL.
    #[arg(long)]
    pub manifest: String,

    /// Only list this volume.
    #[arg(long)]
    pub volume: Option<u32>,

    #[command(flatten)]
    pub layout: LayoutArgs,
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Manifest path or http(s) URL.
    #[arg(long)]
    pub manifest: String,

    /// Event script, one event per line.
    #[arg(long)]
    pub script: String,

    /// JSON file used as key-value storage (default: in-memory).
    #[arg(long)]
    pub storage: Option<String>,

    /// Location fragment the session starts at.
    #[arg(long, default_value = "#/")]
    pub start: String,

    /// Base URL to prefetch assets from (default: no prefetch requests).
    #[arg(long)]
    pub prefetch_base: Option<String>,

    #[command(flatten)]
    pub layout: LayoutArgs,
}

#[derive(Debug, Args)]
pub struct ProgressArgs {
    /// JSON file used as key-value storage.
    #[arg(long)]
    pub storage: String,
}
