//! # gateway-settings
//!
//! Persisted configuration store for the home-automation gateway.
//!
//! The gateway keeps its operational settings (network parameters, logging,
//! per-device and per-group overrides) in one TOML file.  This crate loads
//! that file into a [`SettingsStore`], serves reads merged over compiled-in
//! defaults, and applies a small set of mutations that always write the file
//! and read it straight back before notifying registered change handlers.
//!
//! - **`domain`** – the document value model, the defaults, and device/group
//!   entry views.  Pure; no I/O.
//! - **`application`** – the store itself and its sync protocol.
//! - **`infrastructure`** – file persistence behind the `DocumentStorage`
//!   trait, an in-memory double for tests, and data-directory resolution.
//!
//! ```no_run
//! use gateway_settings::{SettingsStore, StoreConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StoreConfig::from_env()?;
//! let mut store = SettingsStore::open_file(&config)?;
//! store.add_device("0x00158d0001e8a1b2")?;
//! store.change_friendly_name("0x00158d0001e8a1b2", "hallway_sensor")?;
//! assert_eq!(store.get()["advanced"]["channel"].as_integer(), Some(11));
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::settings_store::{ChangeHandler, HandlerError, SettingsError, SettingsStore};
pub use domain::defaults::{default_log_level, defaults_document, DefaultsOptions};
pub use domain::document::{merge, Document, DocumentError};
pub use domain::entities::{DeviceEntry, DeviceKey, GroupEntry, GroupKey};
pub use infrastructure::paths::{debug_from_env, StoreConfig};
pub use infrastructure::storage::file::FileStorage;
pub use infrastructure::storage::memory::MemoryStorage;
pub use infrastructure::storage::{DocumentStorage, StorageError};
