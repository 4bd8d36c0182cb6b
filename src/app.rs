//! Application orchestrator.
//! Loads config, applies CLI overrides, initializes logging, then runs one subcommand.
//! `resolve` is pure and works everywhere; the other subcommands need the Windows API.

use anyhow::{bail, Context, Result};
use tracing::{debug, error, info};

use ntinterop::output as out;
use ntinterop::{
    default_config_path, device_path, load_config, resolve, Config, DeviceAccess, Dispatcher,
    InteropError, NativeApi, OperationOptions, ReplaceOptions, SecurityInformation,
};

use crate::cli::{Args, Command};
use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Handle --print-config before logging init
    if args.print_config {
        print_config_location();
        return Ok(());
    }

    let (mut cfg, source) = load_config()?;
    args.apply_overrides(&mut cfg);
    cfg.validate().context("invalid configuration")?;

    // Hold the guard until the end of run so file logs are flushed.
    let _guard = init_tracing(cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {e}"));
        e
    })?;

    debug!(config = ?source, ?cfg, "starting ntinterop");

    let Some(command) = args.command.as_ref() else {
        out::print_info("Nothing to do. Run with --help to list the subcommands.");
        return Ok(());
    };

    let result = execute(&cfg, command);
    if let Err(e) = &result {
        log_failure(command, e);
    }
    result
}

/// Process exit code for a failed run; interop failures get one per error kind.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<InteropError>()
        .and_then(|e| u8::try_from(e.exit_code()).ok())
        .unwrap_or(1)
}

fn print_config_location() {
    if let Ok(cfg_env) = std::env::var(ntinterop::config::CONFIG_ENV) {
        out::print_info(&format!(
            "Using {} (explicit):\n  {}\n",
            ntinterop::config::CONFIG_ENV,
            cfg_env
        ));
        return;
    }
    match default_config_path() {
        Ok(p) => {
            out::print_info(&format!("Default ntinterop config path:\n  {}\n", p.display()));
            if p.exists() {
                out::print_info("A config file exists at that location.");
            } else {
                out::print_info("No config file exists there; built-in defaults are used.");
            }
        }
        Err(e) => out::print_error(&format!("Could not determine a default config path: {e}")),
    }
}

fn log_failure(command: &Command, err: &anyhow::Error) {
    match err.downcast_ref::<InteropError>() {
        Some(e) => error!(
            code = e.exit_code(),
            kind = e.kind().as_str(),
            native = e.native_code(),
            path = e.path().unwrap_or(""),
            command = command.name(),
            "operation failed"
        ),
        None => error!(error = ?err, command = command.name(), "operation failed"),
    }
}

fn execute(cfg: &Config, command: &Command) -> Result<()> {
    match command {
        Command::Resolve {
            path,
            transacted,
            device,
        } => {
            let resolved = if *device {
                device_path(path)?
            } else {
                resolve(path, cfg.path_format, *transacted)?
            };
            info!(input = %path, resolved = %resolved, kind = ?resolved.kind(), "path resolved");
            out::print_user(resolved.as_str());
            Ok(())
        }
        other => run_native(cfg, other),
    }
}

#[cfg(windows)]
fn run_native(cfg: &Config, command: &Command) -> Result<()> {
    let dispatcher = Dispatcher::from_config(ntinterop::Win32Api, cfg);
    run_with(&dispatcher, cfg, command)
}

#[cfg(not(windows))]
fn run_native(_cfg: &Config, command: &Command) -> Result<()> {
    bail!(
        "'{}' needs the Windows native API; only 'resolve' is available on this platform",
        command.name()
    )
}

/// Native subcommands over any `NativeApi`.
#[cfg_attr(not(windows), allow(dead_code))]
fn run_with<A: NativeApi>(dispatcher: &Dispatcher<A>, cfg: &Config, command: &Command) -> Result<()> {
    let options = OperationOptions::new().with_format(cfg.path_format);
    match command {
        Command::Resolve { .. } => bail!("'resolve' does not use the native API"),
        Command::DiskInfo { device, read_write } => {
            let access = if *read_write {
                DeviceAccess::ReadWrite
            } else {
                DeviceAccess::Query
            };
            let info = dispatcher.get_drive_info(device, access)?;
            print_drive_info(&info);
            Ok(())
        }
        Command::Extents { volume } => {
            let extents = dispatcher.get_volume_disk_extents(volume)?;
            out::print_heading(&format!("Extents of {volume}"));
            print_extents(&extents);
            Ok(())
        }
        Command::Replace {
            source,
            destination,
            backup,
            ignore_merge_errors,
        } => {
            let replace = ReplaceOptions {
                ignore_merge_errors: *ignore_merge_errors,
            };
            dispatcher.replace_file(source, destination, backup.as_deref(), replace, &options)?;
            info!(source = %source, destination = %destination, "file replaced");
            out::print_success(&format!("Replaced '{destination}' with '{source}'"));
            Ok(())
        }
        Command::Security { path, info } => {
            let Some(parts) = SecurityInformation::parse(info) else {
                bail!("invalid --info value '{info}' (expected owner, group, dacl, sacl)");
            };
            let descriptor = dispatcher.get_security_descriptor(path, parts, &options)?;
            out::print_heading(&format!("Security descriptor of {path}"));
            out::print_field("length", descriptor.len());
            out::print_field("control", format!("{:#06x}", descriptor.control()));
            if let Some(owner) = descriptor.owner()? {
                out::print_field("owner", owner);
            }
            if let Some(group) = descriptor.group()? {
                out::print_field("group", group);
            }
            if let Some(dacl) = descriptor.dacl()? {
                out::print_field("dacl entries", dacl.ace_count);
            }
            if let Some(sacl) = descriptor.sacl()? {
                out::print_field("sacl entries", sacl.ace_count);
            }
            Ok(())
        }
    }
}

#[cfg_attr(not(windows), allow(dead_code))]
fn print_drive_info(info: &ntinterop::ioctl::DriveInfo) {
    out::print_heading(&format!("Drive {}", info.device));
    match &info.geometry {
        Some(g) => {
            out::print_field("disk size", g.disk_size);
            out::print_field("bytes per sector", g.geometry.bytes_per_sector);
            out::print_field("sectors per track", g.geometry.sectors_per_track);
            out::print_field("tracks per cylinder", g.geometry.tracks_per_cylinder);
            out::print_field("cylinders", g.geometry.cylinders);
        }
        None => out::print_field("geometry", "not supported"),
    }
    match &info.layout {
        Some(layout) => {
            out::print_field("partition style", format!("{:?}", layout.header.style));
            for p in layout.used_partitions() {
                out::print_field(
                    &format!("partition {}", p.partition_number),
                    format!("offset {} length {}", p.starting_offset, p.partition_length),
                );
            }
        }
        None => out::print_field("layout", "not supported"),
    }
    if let Some(p) = &info.partition {
        out::print_field(
            "this partition",
            format!("#{} offset {}", p.partition_number, p.starting_offset),
        );
    }
    if let Some(extents) = &info.extents {
        print_extents(extents);
    }
}

#[cfg_attr(not(windows), allow(dead_code))]
fn print_extents(extents: &ntinterop::ioctl::VolumeDiskExtents) {
    for e in &extents.extents {
        out::print_field(
            &format!("disk {}", e.disk_number),
            format!("offset {} length {}", e.starting_offset, e.extent_length),
        );
    }
}
