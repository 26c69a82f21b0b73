//! JSON configuration file adapter.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::info;

use crate::app::ports::ConfigPort;
use crate::config::ControllerConfig;
use crate::error::ConfigError;

/// Loads [`ControllerConfig`] from a JSON file.  A missing file yields
/// the defaults; anything present is validated before it is returned.
pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<ControllerConfig, ConfigError> {
        let config = match fs::read_to_string(&self.path) {
            Ok(text) => serde_json::from_str::<ControllerConfig>(&text)
                .map_err(|e| ConfigError::Corrupted(format!("{}: {e}", self.path.display())))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No config at {}; using defaults", self.path.display());
                ControllerConfig::default()
            }
            Err(e) => return Err(ConfigError::IoError(format!("{}: {e}", self.path.display()))),
        };
        config.validate()?;
        Ok(config)
    }
}
