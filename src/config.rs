use anyhow::Context as _;

pub const DEFAULT_ASSET_ROOT: &str = "assets";
pub const DEFAULT_IMAGE_EXTENSION: &str = "jpg";
pub const DEFAULT_DRAG_THRESHOLD_PX: f64 = 3.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub asset_root: String,
    pub image_extension: String,
    /// Pointer travel, in pixels, after which a press on a zoomed image counts as a drag.
    pub drag_threshold_px: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_root: DEFAULT_ASSET_ROOT.to_owned(),
            image_extension: DEFAULT_IMAGE_EXTENSION.to_owned(),
            drag_threshold_px: DEFAULT_DRAG_THRESHOLD_PX,
        }
    }
}

impl ViewerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(root) = non_empty(lookup("PAGETURN_ASSET_ROOT")) {
            config.asset_root = root;
        }
        if let Some(ext) = non_empty(lookup("PAGETURN_IMAGE_EXT")) {
            config.image_extension = ext;
        }
        if let Some(raw) = non_empty(lookup("PAGETURN_DRAG_THRESHOLD_PX")) {
            config.drag_threshold_px = parse_threshold(&raw).with_context(|| {
                format!("invalid PAGETURN_DRAG_THRESHOLD_PX={raw:?}. expected a number >= 0")
            })?;
        }

        Ok(config)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_threshold(raw: &str) -> anyhow::Result<f64> {
    let value: f64 = raw.parse().context("parse number")?;
    if !value.is_finite() || value < 0.0 {
        anyhow::bail!("drag threshold must be finite and non-negative: {value}");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = ViewerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn env_overrides_and_blank_values_are_ignored() {
        let config = ViewerConfig::from_lookup(lookup(&[
            ("PAGETURN_ASSET_ROOT", " https://cdn.example.com "),
            ("PAGETURN_IMAGE_EXT", "  "),
            ("PAGETURN_DRAG_THRESHOLD_PX", "6.5"),
        ]))
        .unwrap();
        assert_eq!(config.asset_root, "https://cdn.example.com");
        assert_eq!(config.image_extension, DEFAULT_IMAGE_EXTENSION);
        assert_eq!(config.drag_threshold_px, 6.5);
    }

    #[test]
    fn invalid_threshold_names_the_variable() {
        let err = ViewerConfig::from_lookup(lookup(&[("PAGETURN_DRAG_THRESHOLD_PX", "-1")]))
            .unwrap_err()
            .to_string();
        assert!(err.contains("PAGETURN_DRAG_THRESHOLD_PX"));
    }
}
