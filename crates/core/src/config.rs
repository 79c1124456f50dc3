//! Configuration loading utilities
//!
//! Configuration is layered, highest priority first:
//! 1. CLI arguments
//! 2. Environment variables
//! 3. Config file (searched in standard locations)
//! 4. Built-in defaults

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::APP_NAME;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("failed to parse config file '{0}'")]
    Parse(PathBuf, #[source] toml::de::Error),
}

/// Describes where a configuration was loaded from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Explicit path provided via CLI or env var
    Explicit(PathBuf),
    /// Found in current working directory
    CurrentDir(PathBuf),
    /// Found in XDG config home (~/.config/cge-monitor/)
    XdgConfig(PathBuf),
    /// Found in system config (/etc/cge-monitor/)
    System(PathBuf),
    /// No config file found, using defaults
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Explicit(p)
            | ConfigSource::CurrentDir(p)
            | ConfigSource::XdgConfig(p)
            | ConfigSource::System(p) => Some(p),
            ConfigSource::Defaults => None,
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.path() {
            Some(p) => write!(f, "{}", p.display()),
            None => write!(f, "(defaults)"),
        }
    }
}

/// Find a configuration file in standard locations
///
/// Search order:
/// 1. Environment variable (e.g. CGE_MONITOR_CONFIG)
/// 2. Current directory
/// 3. XDG config home ($XDG_CONFIG_HOME/cge-monitor/ or ~/.config/cge-monitor/)
/// 4. System config (/etc/cge-monitor/)
pub fn find_config_file(env_var: &str, filename: &str) -> ConfigSource {
    if let Ok(path) = env::var(env_var) {
        let p = PathBuf::from(&path);
        if p.exists() {
            return ConfigSource::Explicit(p);
        }
    }

    let local = PathBuf::from(filename);
    if local.exists() {
        return ConfigSource::CurrentDir(local);
    }

    let xdg_path = xdg_base("XDG_CONFIG_HOME", ".config").join(filename);
    if xdg_path.exists() {
        return ConfigSource::XdgConfig(xdg_path);
    }

    let system = PathBuf::from(format!("/etc/{}/{}", APP_NAME, filename));
    if system.exists() {
        return ConfigSource::System(system);
    }

    ConfigSource::Defaults
}

fn xdg_base(xdg_var: &str, home_relative: &str) -> PathBuf {
    if let Ok(xdg) = env::var(xdg_var) {
        PathBuf::from(xdg).join(APP_NAME)
    } else if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(home_relative).join(APP_NAME)
    } else {
        PathBuf::from(home_relative).join(APP_NAME)
    }
}

/// Load and parse a TOML configuration file.
///
/// `ConfigSource::Defaults` yields `T::default()`.
pub fn load_config<T: DeserializeOwned + Default>(source: &ConfigSource) -> Result<T, ConfigError> {
    match source.path() {
        Some(path) => {
            let content =
                fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
            toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
        }
        None => Ok(T::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Sample {
        retention_hours: Option<u64>,
        stations: Option<Vec<u32>>,
    }

    #[test]
    fn test_config_source_display() {
        let source = ConfigSource::CurrentDir(PathBuf::from("collector.toml"));
        assert_eq!(format!("{}", source), "collector.toml");

        let source = ConfigSource::Defaults;
        assert_eq!(format!("{}", source), "(defaults)");
    }

    #[test]
    fn test_defaults_source_yields_default_value() {
        let config: Sample = load_config(&ConfigSource::Defaults).unwrap();
        assert_eq!(config, Sample::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "retention_hours = 12\nstations = [504, 1000842]").unwrap();

        let source = ConfigSource::Explicit(file.path().to_path_buf());
        let config: Sample = load_config(&source).unwrap();
        assert_eq!(config.retention_hours, Some(12));
        assert_eq!(config.stations, Some(vec![504, 1000842]));
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "retention_hours = \"twelve\"").unwrap();

        let source = ConfigSource::Explicit(file.path().to_path_buf());
        let result: Result<Sample, _> = load_config(&source);
        assert!(matches!(result, Err(ConfigError::Parse(_, _))));
    }

    #[test]
    fn test_missing_explicit_file_is_a_read_error() {
        let source = ConfigSource::Explicit(PathBuf::from("/nonexistent/collector.toml"));
        let result: Result<Sample, _> = load_config(&source);
        assert!(matches!(result, Err(ConfigError::Read(_, _))));
    }
}
