pub mod duration;
pub mod exporter_config;
pub mod permissions;

pub use duration::{parse_scrape_interval, ScrapeInterval, DEFAULT_SCRAPE_INTERVAL};
pub use exporter_config::{
    parse_log_level, ConfigFile, DriverSettings, ExporterSettings, DEFAULT_LISTEN_PORT,
};
pub use permissions::open_owner_only;

use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::errors::{ConfigError, ConfigResult};

/// Default location of the config file
pub const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

/// Loads and validates the exporter config.
///
/// The permission gate runs first; nothing is parsed from a file that other
/// users could read.
pub fn load_exporter_config(path: impl AsRef<Path>) -> ConfigResult<ExporterSettings> {
    let path = path.as_ref();
    let mut file = open_owner_only(path)?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|source| ConfigError::LoadError {
            path: path.display().to_string(),
            source,
        })?;
    info!("[config] loaded {}", path.display());

    ConfigFile::from_yaml(&content)?.into_settings()
}
