use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{
    camera::CameraConfig, debounce::DebounceConfig, gesture::ClassifierConfig,
    landmark::DetectorConfig, sink::SinkConfig,
};

/// Every tunable in one place, loadable from a TOML file. Any section or
/// key left out of the file keeps its default, so a config file only needs
/// to name what it changes.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub camera: CameraConfig,
    pub detector: DetectorConfig,
    pub classifier: ClassifierConfig,
    pub debounce: DebounceConfig,
    pub sink: SinkConfig,
}

pub fn load(path: Option<&str>) -> Result<AppConfig> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };

    let raw = fs::read_to_string(Path::new(path))
        .with_context(|| format!("failed to read config file {path}"))?;
    toml::from_str(&raw).with_context(|| format!("failed to parse config file {path}"))
}
