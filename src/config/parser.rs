use super::Config;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "slink.yaml";
const ALT_CONFIG_FILE_NAME: &str = "slink.yml";

pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Self
    }

    /// Find config file starting from current directory
    pub fn find_config_file(&self) -> Result<PathBuf> {
        let current_dir = std::env::current_dir()?;
        Self::find_config_in_dir(&current_dir)
    }

    pub fn find_config_in_dir(dir: &Path) -> Result<PathBuf> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Ok(config_path);
        }

        let alt_path = dir.join(ALT_CONFIG_FILE_NAME);
        if alt_path.exists() {
            return Ok(alt_path);
        }

        if let Some(parent) = dir.parent() {
            return Self::find_config_in_dir(parent);
        }

        Err(Error::Config(format!(
            "Could not find {} in current directory or any parent",
            CONFIG_FILE_NAME
        )))
    }

    /// Load and validate config from file path
    pub fn load_config<P: AsRef<Path>>(&self, path: P) -> Result<Config> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config = self.parse_config(&content)?;
        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Parse config from YAML string
    pub fn parse_config(&self, content: &str) -> Result<Config> {
        // An empty file means "all defaults"
        if content.trim().is_empty() {
            return Ok(Config::default());
        }

        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| Error::Parse(format!("Failed to parse YAML config: {}", e)))?;

        Ok(config)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogMode;
    use std::time::Duration;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
database:
  path: /var/lib/slink/links.db
  schema: base.sql

server:
  host: 0.0.0.0
  port: 8000

ingest:
  enabled: true
  port: 8001
  log_file: logs/addlink.log
  startup_attempts: 10
  startup_interval: 500ms
  grace_period: 3s
  write_timeout: 15s

log: all
log_file: logs/slink.log
"#;

        let config = Parser::new().parse_config(yaml).unwrap();

        assert_eq!(config.database.path, PathBuf::from("/var/lib/slink/links.db"));
        assert_eq!(config.database.schema, Some(PathBuf::from("base.sql")));
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.ingest.host, "127.0.0.1");
        assert_eq!(config.ingest.startup_attempts, 10);
        assert_eq!(config.ingest.startup_interval, Duration::from_millis(500));
        assert_eq!(config.ingest.grace_period, Duration::from_secs(3));
        assert_eq!(config.ingest.probe_timeout, Duration::from_secs(2));
        assert_eq!(config.ingest.write_timeout, Duration::from_secs(15));
        assert_eq!(config.log, LogMode::All);
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Parser::new().parse_config("\n").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.ingest.port, 5001);
        assert!(config.ingest.enabled);
    }

    #[test]
    fn test_rejects_bad_duration() {
        let yaml = "ingest:\n  startup_interval: eventually\n";
        let err = Parser::new().parse_config(yaml).unwrap_err();
        assert!(err.to_string().contains("invalid duration"));
    }

    #[test]
    fn test_find_and_load_from_parent_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "server:\n  port: 7000\n",
        )
        .unwrap();

        let found = Parser::find_config_in_dir(&nested).unwrap();
        assert_eq!(found, temp_dir.path().join(CONFIG_FILE_NAME));

        let config = Parser::new().load_config(&found).unwrap();
        assert_eq!(config.server.port, 7000);
    }

    #[test]
    fn test_load_rejects_invalid_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "ingest:\n  startup_attempts: 0\n").unwrap();

        let err = Parser::new().load_config(&path).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
