//! Compiled-in defaults.
//!
//! [`defaults_document`] builds the baseline that every read is merged over.
//! The store builds it once at construction and never writes to it, so any
//! key declared here is always present in [`SettingsStore::get`] output.
//!
//! Two inputs come from outside: the data directory (log files live below
//! it) and the debug toggle, which selects the default log level.  Both are
//! captured in [`DefaultsOptions`] and read once.
//!
//! [`SettingsStore::get`]: crate::application::settings_store::SettingsStore::get

use std::path::PathBuf;

use toml::{Table, Value};

use super::document::Document;

/// Default Zigbee PAN identifier.
pub const DEFAULT_PAN_ID: i64 = 0x1a62;
/// Default Zigbee radio channel.
pub const DEFAULT_CHANNEL: i64 = 11;
/// Default serial baud rate for the coordinator adapter.
pub const DEFAULT_BAUDRATE: i64 = 115_200;
/// Default extended PAN identifier.
pub const DEFAULT_EXT_PAN_ID: [u8; 8] = [0xDD; 8];
/// Default network key.  Changing it requires re-pairing every device.
pub const DEFAULT_NETWORK_KEY: [u8; 16] = [1, 3, 5, 7, 9, 11, 13, 15, 0, 2, 4, 6, 8, 10, 12, 13];

/// Inputs to the defaults document that are resolved at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultsOptions {
    /// Gateway data directory.
    pub data_dir: PathBuf,
    /// Debug mode selects `debug` instead of `info` as the log level.
    pub debug: bool,
}

/// Default `advanced.log_level` for the given debug toggle.
pub fn default_log_level(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Builds the defaults document.
pub fn defaults_document(options: &DefaultsOptions) -> Document {
    let log_directory = options
        .data_dir
        .join("log")
        .join("%TIMESTAMP%")
        .to_string_lossy()
        .into_owned();

    let advanced = table([
        ("log_directory", Value::String(log_directory)),
        (
            "log_level",
            Value::String(default_log_level(options.debug).to_string()),
        ),
        ("soft_reset_timeout", Value::Integer(0)),
        ("pan_id", Value::Integer(DEFAULT_PAN_ID)),
        ("ext_pan_id", bytes(&DEFAULT_EXT_PAN_ID)),
        ("channel", Value::Integer(DEFAULT_CHANNEL)),
        ("baudrate", Value::Integer(DEFAULT_BAUDRATE)),
        ("rtscts", Value::Boolean(true)),
        // Seconds; 0 disables availability tracking.
        ("availability_timeout", Value::Integer(0)),
        ("availability_blacklist", Value::Array(Vec::new())),
        // Resend the full cached state with every message.
        ("cache_state", Value::Boolean(true)),
        // "ISO_8601" | "epoch" | "disable"
        ("last_seen", Value::String("disable".to_string())),
        ("elapsed", Value::Boolean(false)),
        ("network_key", bytes(&DEFAULT_NETWORK_KEY)),
    ]);

    table([
        ("permit_join", Value::Boolean(false)),
        (
            "mqtt",
            Value::Table(table([("include_device_information", Value::Boolean(false))])),
        ),
        ("groups", Value::Table(Table::new())),
        ("device_options", Value::Table(Table::new())),
        (
            "experimental",
            Value::Table(table([("livolo", Value::Boolean(false))])),
        ),
        ("advanced", Value::Table(advanced)),
    ])
}

fn table<const N: usize>(entries: [(&str, Value); N]) -> Table {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn bytes(values: &[u8]) -> Value {
    Value::Array(values.iter().map(|b| Value::Integer(i64::from(*b))).collect())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
