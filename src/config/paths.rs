//! Default path helpers and symlink checks.
//! Determines OS-appropriate config/log paths and detects symlinked ancestors.

use anyhow::{anyhow, Result};
use dirs::{config_dir, data_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::CONFIG_ENV;

/// Config file location: `NTINTEROP_CONFIG` if set (relative values are taken
/// from the current directory), else `<config_dir>/ntinterop/config.xml`.
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(p) = env::var_os(CONFIG_ENV) {
        let p = PathBuf::from(p);
        if p.is_absolute() {
            return Ok(p);
        }
        return Ok(env::current_dir()?.join(p));
    }
    config_dir()
        .map(|base| base.join("ntinterop").join("config.xml"))
        .ok_or_else(|| anyhow!("no config directory for this user; set {CONFIG_ENV}"))
}

/// Suggested log file: next to an explicit config file, else
/// `<data_dir>/ntinterop/ntinterop.log`.
pub fn default_log_path() -> Result<PathBuf> {
    if env::var_os(CONFIG_ENV).is_some() {
        let cfg = default_config_path()?;
        let dir = cfg.parent().unwrap_or_else(|| Path::new("."));
        return Ok(dir.join("ntinterop.log"));
    }
    data_dir()
        .map(|base| base.join("ntinterop").join("ntinterop.log"))
        .ok_or_else(|| anyhow!("no data directory for this user"))
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if let Ok(meta) = fs::symlink_metadata(anc) {
            if meta.file_type().is_symlink() {
                return Ok(true);
            }
        }
        p = anc.parent();
    }
    Ok(false)
}
