//! Config module.
//! Provides the configuration types, default paths, XML loading, and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
pub use types::{Config, LogLevel};
pub use xml::{load_config, load_config_from_xml_path};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "NTINTEROP_CONFIG";
/// Upper bound accepted for `max_attempts`; 2^32 times the initial guess is
/// already far beyond any device-control structure.
pub const MAX_ATTEMPTS_CEILING: u32 = 32;
