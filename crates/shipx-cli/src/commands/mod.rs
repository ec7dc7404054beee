pub mod config;
pub mod extract;

use std::path::{Path, PathBuf};

use tracing::debug;

use shipx_core::ShipxConfig;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shipx")
        .join("config.json")
}

/// Configuration from `--config`, else the default file if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ShipxConfig> {
    if let Some(path) = config_path {
        debug!("Loading configuration from {}", path);
        return Ok(ShipxConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading configuration from {}", default_path.display());
        Ok(ShipxConfig::from_file(&default_path)?)
    } else {
        Ok(ShipxConfig::default())
    }
}
