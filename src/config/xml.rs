//! XML configuration support.
//!
//! ```xml
//! <config>
//!   <log_level>info</log_level>
//!   <log_file>C:\logs\ntinterop.log</log_file>
//!   <path_format>full</path_format>
//!   <initial_buffer_size>1024</initial_buffer_size>
//!   <max_attempts>8</max_attempts>
//! </config>
//! ```
//!
//! Every element is optional. Unknown elements are rejected so typos surface
//! instead of silently falling back to defaults.

use anyhow::{anyhow, Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use super::paths::default_config_path;
use super::types::{Config, LogLevel};
use crate::path::PathFormat;

#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    log_level: Option<String>,
    log_file: Option<String>,
    path_format: Option<String>,
    #[serde(default, deserialize_with = "de_trimmed_opt")]
    initial_buffer_size: Option<usize>,
    #[serde(default, deserialize_with = "de_trimmed_opt")]
    max_attempts: Option<u32>,
}

// Numbers may carry surrounding whitespace; empty means unset.
fn de_trimmed_opt<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    use serde::de::Error;
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(D::Error::custom),
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(s) = non_empty(parsed.log_level.as_deref()) {
        cfg.log_level = LogLevel::from_str(s).map_err(|e| anyhow!(e))?;
    }
    cfg.log_file = non_empty(parsed.log_file.as_deref()).map(PathBuf::from);
    if let Some(s) = non_empty(parsed.path_format.as_deref()) {
        cfg.path_format = PathFormat::from_str(s).map_err(|e| anyhow!(e))?;
    }
    cfg.initial_buffer_size = parsed.initial_buffer_size;
    if let Some(n) = parsed.max_attempts {
        cfg.max_attempts = n;
    }
    Ok(cfg)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    xml_to_config(parsed).with_context(|| format!("invalid value in config xml '{}'", path.display()))
}

/// Load the effective config. Returns the file it came from, or `None` when no
/// file exists and defaults are used.
pub fn load_config() -> Result<(Config, Option<PathBuf>)> {
    let path = default_config_path().context("resolve config path")?;
    if !path.exists() {
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok((Config::default(), None));
    }
    let cfg = load_config_from_xml_path(&path)?;
    debug!(path = %path.display(), "config loaded");
    Ok((cfg, Some(path)))
}
