//! Gateway settings CLI — entry point.
//!
//! A thin caller of [`SettingsStore`] for inspecting and editing the gateway
//! configuration file by hand.  Every mutating command goes through the
//! store, so the file is rewritten and re-read exactly as it would be by the
//! gateway itself.
//!
//! # Usage
//!
//! ```text
//! gateway-settings [--data-dir DIR] [--json] <COMMAND>
//!
//! Commands:
//!   init                         Create an empty configuration file
//!   show [--raw]                 Print the merged (or raw) configuration
//!   set <PATH> <VALUE>           Assign a TOML literal at a dotted path
//!   add-device <IEEE_ADDR>       Add a device with default options
//!   remove-device <IEEE_ADDR>    Remove a device
//!   rename <OLD> <NEW>           Change a device friendly name
//!   devices                      List devices
//!   device <IEEE_ADDR>           Print a device entry
//!   resolve <FRIENDLY_NAME>      Print the address of a device
//!   group <ID>                   Print a group entry
//! ```
//!
//! | Variable       | Description                                         |
//! |----------------|-----------------------------------------------------|
//! | `GATEWAY_DATA` | Data directory (same as `--data-dir`)               |
//! | `DEBUG`        | Non-empty value makes `debug` the default log level |
//! | `RUST_LOG`     | Overrides the log filter entirely                   |

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use toml::{Table, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gateway_settings::{
    debug_from_env, default_log_level, Document, DocumentStorage, FileStorage, SettingsStore,
    StoreConfig,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Inspect and edit the gateway configuration store.
#[derive(Debug, Parser)]
#[command(
    name = "gateway-settings",
    about = "Inspect and edit the gateway configuration store",
    version
)]
struct Cli {
    /// Data directory holding `configuration.toml`.
    ///
    /// Defaults to the platform data directory when neither this flag nor
    /// `GATEWAY_DATA` is set.
    #[arg(long, env = "GATEWAY_DATA")]
    data_dir: Option<PathBuf>,

    /// Print documents as JSON instead of TOML.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an empty configuration file if none exists.
    Init,
    #[command(flatten)]
    Store(StoreCommand),
}

/// Commands that operate on an opened store.
#[derive(Debug, Subcommand)]
enum StoreCommand {
    /// Print the configuration merged over the defaults.
    Show {
        /// Print the stored document without defaults.
        #[arg(long)]
        raw: bool,
    },
    /// Assign a value at a dotted path, e.g. `advanced.channel 15`.
    ///
    /// The value is parsed as a TOML literal; anything that does not parse is
    /// stored as a plain string.
    Set { path: String, value: String },
    /// Add a device with default options, replacing any existing entry.
    AddDevice { ieee_addr: String },
    /// Remove a device.
    RemoveDevice { ieee_addr: String },
    /// Change the friendly name of a device.
    Rename { old: String, new: String },
    /// List all devices.
    Devices,
    /// Print a device entry.
    Device { ieee_addr: String },
    /// Print the hardware address of the device with this friendly name.
    Resolve { friendly_name: String },
    /// Print a group entry.
    Group { id: String },
}

impl Cli {
    fn store_config(&self) -> anyhow::Result<StoreConfig> {
        match &self.data_dir {
            Some(dir) => Ok(StoreConfig::new(dir, debug_from_env())),
            None => StoreConfig::from_env().context("cannot locate the gateway data directory"),
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Executes the parsed command and returns what should be printed.
fn run(cli: &Cli) -> anyhow::Result<String> {
    let config = cli.store_config()?;
    match &cli.command {
        Command::Init => init(&config),
        Command::Store(command) => {
            let path = config.config_file_path();
            let mut store = SettingsStore::open_file(&config)
                .with_context(|| format!("cannot load {}", path.display()))?;
            store.add_on_change_handler(|| {
                info!("configuration changed");
                Ok(())
            });
            execute(&mut store, command, cli.json)
        }
    }
}

/// Creates an empty configuration file.  The store itself never does this:
/// opening a missing file is an error.
fn init(config: &StoreConfig) -> anyhow::Result<String> {
    let path = config.config_file_path();
    let storage = FileStorage::new(&path);
    if storage.exists() {
        info!(path = %path.display(), "configuration already exists");
    } else {
        storage
            .save(&Document::new())
            .with_context(|| format!("cannot create {}", path.display()))?;
        info!(path = %path.display(), "configuration created");
    }
    Ok(path.display().to_string())
}

fn execute(
    store: &mut SettingsStore,
    command: &StoreCommand,
    json: bool,
) -> anyhow::Result<String> {
    match command {
        StoreCommand::Show { raw } => {
            let doc = if *raw {
                store.document().clone()
            } else {
                store.get()
            };
            render(&doc, json)
        }
        StoreCommand::Set { path, value } => {
            let segments = split_path(path)?;
            store.set(&segments, parse_value(value))?;
            Ok(String::new())
        }
        StoreCommand::AddDevice { ieee_addr } => {
            store.add_device(ieee_addr)?;
            Ok(String::new())
        }
        StoreCommand::RemoveDevice { ieee_addr } => {
            if store.device(ieee_addr).is_none() {
                bail!("no device `{ieee_addr}`");
            }
            store.remove_device(ieee_addr)?;
            Ok(String::new())
        }
        StoreCommand::Rename { old, new } => {
            if !store.change_friendly_name(old, new)? {
                bail!("no device named `{old}`");
            }
            Ok(String::new())
        }
        StoreCommand::Devices => {
            let devices: Table = store
                .devices()
                .into_iter()
                .map(|(key, entry)| (key, Value::from(entry)))
                .collect();
            render(&devices, json)
        }
        StoreCommand::Device { ieee_addr } => {
            let device = store
                .device(ieee_addr)
                .with_context(|| format!("no device `{ieee_addr}`"))?;
            render(&device, json)
        }
        StoreCommand::Resolve { friendly_name } => store
            .ieee_addr_by_friendly_name(friendly_name)
            .with_context(|| format!("no device named `{friendly_name}`")),
        StoreCommand::Group { id } => {
            let group = store.group(id).with_context(|| format!("no group `{id}`"))?;
            render(&group, json)
        }
    }
}

fn split_path(path: &str) -> anyhow::Result<Vec<&str>> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        bail!("invalid settings path `{path}`");
    }
    Ok(segments)
}

/// Parses `literal` as a TOML value, falling back to a plain string.
fn parse_value(literal: &str) -> Value {
    toml::from_str::<Table>(&format!("value = {literal}"))
        .ok()
        .and_then(|mut t| t.remove("value"))
        .unwrap_or_else(|| Value::String(literal.to_string()))
}

fn render<T: Serialize>(value: &T, json: bool) -> anyhow::Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(toml::to_string_pretty(value)?)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    // RUST_LOG wins; otherwise use the same level the defaults document
    // would select.  Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_level(debug_from_env()))),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = run(&cli)?;
    if !output.is_empty() {
        println!("{}", output.trim_end());
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
