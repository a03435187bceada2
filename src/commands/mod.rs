mod add;
mod doctor;
mod ingest;
mod serve;

pub use add::run_add;
pub use doctor::run_doctor;
pub use ingest::run_ingest;
pub use serve::run_serve;

use slink::{Config, Error, Parser as ConfigParser};
use std::path::PathBuf;

/// Configuration every command runs with, plus where it came from.
pub struct Settings {
    pub config: Config,
    /// `None` when no file was found and defaults are in use.
    pub config_path: Option<PathBuf>,
}

impl Settings {
    /// Load `explicit` if given, otherwise search for `slink.yaml` upwards
    /// from the current directory and fall back to defaults.
    pub fn load(explicit: Option<PathBuf>) -> anyhow::Result<Self> {
        let parser = ConfigParser::new();

        let config_path = match explicit {
            Some(path) => Some(path),
            None => match parser.find_config_file() {
                Ok(path) => Some(path),
                Err(Error::Config(_)) => None,
                Err(e) => return Err(e.into()),
            },
        };

        let config = match &config_path {
            Some(path) => parser.load_config(path)?,
            None => Config::default(),
        };

        Ok(Self {
            config,
            config_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_config_is_loaded() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.yaml");
        std::fs::write(&path, "server:\n  port: 8080\n").unwrap();

        let settings = Settings::load(Some(path.clone())).unwrap();
        assert_eq!(settings.config.server.port, 8080);
        assert_eq!(settings.config_path, Some(path));
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = Settings::load(Some(temp_dir.path().join("nope.yaml")))
            .err()
            .unwrap();
        assert!(err.to_string().contains("nope.yaml"));
    }
}
