//! CGE Monitor Core Library
//!
//! Shared utilities for the station collector:
//! - Configuration loading (XDG-compliant)
//! - File system utilities (atomic writes)
//! - Application defaults

mod config;
pub mod fs;

pub use config::{find_config_file, load_config, ConfigError, ConfigSource};
pub use fs::{ensure_dir_exists, write_atomic};

/// Application name used for XDG paths
pub const APP_NAME: &str = "cge-monitor";

/// Station page on the municipal emergency management portal.
/// `{station}` is replaced with the numeric station id.
pub const DEFAULT_URL_TEMPLATE: &str = "https://www.cgesp.org/v3/estacao.jsp?POSTO={station}";

/// Station used when none is configured (Butantã)
pub const DEFAULT_STATION: u32 = 1000842;

/// Rolling window kept in each station's series file
pub const DEFAULT_RETENTION_HOURS: u64 = 24;

/// Per-request fetch timeout in seconds
pub const DEFAULT_FETCH_TIMEOUT: u64 = 10;

/// America/Sao_Paulo has not observed DST since 2019
pub const DEFAULT_UTC_OFFSET: &str = "-03:00";
