//! CLI definition and parsing.
//!
//! Notes:
//! - Global flags may appear before or after the subcommand.
//! - --debug is a shorthand for --log-level debug.

use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;
use std::str::FromStr;

use ntinterop::{Config, LogLevel, PathFormat};

/// Diagnostic front end for the ntinterop library.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Inspect Windows paths, disks and security descriptors through the native API"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true, value_parser = LogLevel::from_str)]
    pub log_level: Option<LogLevel>,

    /// Write logs to this file as well (parent must not be a symlink).
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Emit logs in structured JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// How path arguments are interpreted: relative, full or long.
    #[arg(long, global = true, value_parser = PathFormat::from_str)]
    pub format: Option<PathFormat>,

    /// Calls allowed per growable device query.
    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,

    /// Initial buffer size for device queries, in bytes.
    #[arg(long, global = true)]
    pub initial_buffer_size: Option<usize>,

    /// Print the config file location used by ntinterop and exit.
    #[arg(long)]
    pub print_config: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the extended-length form of a path (no filesystem access).
    Resolve {
        path: String,
        /// Validate as if a transaction were active (network paths are refused).
        #[arg(long)]
        transacted: bool,
        /// Treat the argument as a device designator (C:, 0, PhysicalDrive0, ...).
        #[arg(long)]
        device: bool,
    },
    /// Geometry, partition layout, partition info and extents of a drive.
    DiskInfo {
        device: String,
        /// Open read/write instead of query-only (physical drives need elevation).
        #[arg(long)]
        read_write: bool,
    },
    /// Physical disk extents backing a volume.
    Extents { volume: String },
    /// Replace DESTINATION's content with SOURCE.
    Replace {
        #[arg(value_hint = ValueHint::FilePath)]
        source: String,
        #[arg(value_hint = ValueHint::FilePath)]
        destination: String,
        /// Keep the previous DESTINATION content here.
        #[arg(long, value_hint = ValueHint::FilePath)]
        backup: Option<String>,
        #[arg(long)]
        ignore_merge_errors: bool,
    },
    /// Owner, group and ACL summary of a file or directory.
    Security {
        #[arg(value_hint = ValueHint::AnyPath)]
        path: String,
        /// Parts to request: any of owner, group, dacl, sacl (comma separated).
        #[arg(long, default_value = "owner,group,dacl")]
        info: String,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Resolve { .. } => "resolve",
            Command::DiskInfo { .. } => "disk-info",
            Command::Extents { .. } => "extents",
            Command::Replace { .. } => "replace",
            Command::Security { .. } => "security",
        }
    }
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config value).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(p) = &self.log_file {
            cfg.log_file = Some(p.clone());
        }
        if let Some(f) = self.format {
            cfg.path_format = f;
        }
        if let Some(n) = self.max_attempts {
            cfg.max_attempts = n;
        }
        if let Some(n) = self.initial_buffer_size {
            cfg.initial_buffer_size = Some(n);
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
