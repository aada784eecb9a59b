//! Data directory and environment resolution.
//!
//! The configuration file lives in the gateway data directory:
//! - `$GATEWAY_DATA` when set
//! - Windows:  `%APPDATA%\Gateway`
//! - Linux:    `$XDG_DATA_HOME/gateway` or `~/.local/share/gateway`
//! - macOS:    `~/Library/Application Support/Gateway`
//!
//! The `DEBUG` environment variable is read once here and only affects the
//! default log level baked into the defaults document.

use std::ffi::OsString;
use std::path::PathBuf;

use crate::domain::defaults::DefaultsOptions;
use crate::infrastructure::storage::StorageError;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "GATEWAY_DATA";
/// Environment variable enabling debug defaults.
pub const DEBUG_ENV: &str = "DEBUG";
/// File name of the configuration document inside the data directory.
pub const CONFIG_FILE_NAME: &str = "configuration.toml";

/// Where the store keeps its document and how its defaults are built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub file_name: String,
    pub debug: bool,
}

impl StoreConfig {
    /// Configuration rooted at an explicit data directory.
    pub fn new(data_dir: impl Into<PathBuf>, debug: bool) -> Self {
        Self {
            data_dir: data_dir.into(),
            file_name: CONFIG_FILE_NAME.to_string(),
            debug,
        }
    }

    /// Resolves the data directory and debug toggle from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NoPlatformDataDir`] when `GATEWAY_DATA` is
    /// unset and no platform data directory can be determined.
    pub fn from_env() -> Result<Self, StorageError> {
        Ok(Self::new(data_dir()?, debug_from_env()))
    }

    /// Full path to the configuration file.
    pub fn config_file_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }

    pub fn defaults_options(&self) -> DefaultsOptions {
        DefaultsOptions {
            data_dir: self.data_dir.clone(),
            debug: self.debug,
        }
    }
}

/// Determines the gateway data directory.
///
/// # Errors
///
/// Returns [`StorageError::NoPlatformDataDir`] if neither the override nor the
/// platform base directory is available.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    std::env::var_os(DATA_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(platform_data_dir)
        .ok_or(StorageError::NoPlatformDataDir)
}

/// Reads the debug toggle from `DEBUG`.
pub fn debug_from_env() -> bool {
    debug_enabled(std::env::var_os(DEBUG_ENV))
}

/// A set, non-empty `DEBUG` value turns debug defaults on.
fn debug_enabled(value: Option<OsString>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

fn platform_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Gateway"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local").join("share"))
            })?;
        Some(base.join("gateway"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("Gateway")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
