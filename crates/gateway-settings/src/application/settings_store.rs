//! The settings store.
//!
//! Reads are served from the in-memory document.  [`SettingsStore::get`]
//! layers it over the defaults; entity reads (`device`, `group`, ...) look at
//! the document alone.
//!
//! # Sync protocol
//!
//! Every mutator edits the in-memory document and then runs the same cycle:
//!
//! ```text
//! save(document)  ──►  document = load()  ──►  handler_1() … handler_n()
//! ```
//!
//! Reloading right after the save means the in-memory document is always
//! exactly what a cold start would read from the file.  Handlers run in
//! registration order on the calling thread.  A failing handler stops the
//! cycle and its error is returned to the caller; the save has already
//! happened by then and is not rolled back.
//!
//! Operations on absent entities are not errors: removing or updating a
//! device that does not exist returns without touching storage, and lookups
//! return `None`.
//!
//! The store is not synchronised.  Callers sharing one across threads must
//! serialise access themselves.

use thiserror::Error;
use toml::{Table, Value};
use tracing::{debug, info, trace, warn};

use crate::domain::defaults::defaults_document;
use crate::domain::document::{is_truthy, merge, set_path, Document, DocumentError};
use crate::domain::entities::{
    find_by_friendly_name, DeviceEntry, DeviceKey, GroupEntry, GroupKey, DEVICES_KEY,
    FRIENDLY_NAME, GROUPS_KEY,
};
use crate::infrastructure::paths::StoreConfig;
use crate::infrastructure::storage::file::FileStorage;
use crate::infrastructure::storage::{DocumentStorage, StorageError};

/// Error returned by a change handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// A zero-argument callback run after every successful sync.
pub type ChangeHandler = Box<dyn FnMut() -> Result<(), HandlerError>>;

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A path assignment was rejected before anything was changed.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Loading or saving the document failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A change handler failed after the document was persisted.
    #[error("change handler #{index} failed: {source}")]
    Handler {
        index: usize,
        #[source]
        source: HandlerError,
    },
}

/// Persisted configuration store.
pub struct SettingsStore<S: DocumentStorage = FileStorage> {
    storage: S,
    defaults: Document,
    document: Document,
    handlers: Vec<ChangeHandler>,
}

impl SettingsStore<FileStorage> {
    /// Opens the store backed by the configuration file described by
    /// `config`, building defaults from the same configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Storage`] if the file is missing, unreadable
    /// or not valid TOML.
    pub fn open_file(config: &StoreConfig) -> Result<Self, SettingsError> {
        let storage = FileStorage::new(config.config_file_path());
        Self::open(storage, defaults_document(&config.defaults_options()))
    }
}

impl<S: DocumentStorage> SettingsStore<S> {
    /// Loads the document from `storage`.
    ///
    /// # Errors
    ///
    /// Load failures are returned as is; no fallback document is used.
    pub fn open(storage: S, defaults: Document) -> Result<Self, SettingsError> {
        let document = storage.load()?;
        debug!(keys = document.len(), "settings store opened");
        Ok(Self {
            storage,
            defaults,
            document,
            handlers: Vec::new(),
        })
    }

    // ── Reads ─────────────────────────────────────────────────────────────────

    /// Returns the defaults with the document merged over them.
    ///
    /// The result is a fresh value; mutating it does not affect the store.
    pub fn get(&self) -> Document {
        merge(&self.defaults, &self.document)
    }

    /// The live document as last loaded from storage.
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn defaults(&self) -> &Document {
        &self.defaults
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns the entry stored for `key`, without defaults applied.
    pub fn device(&self, key: &str) -> Option<DeviceEntry> {
        self.section(DEVICES_KEY)?
            .get(key)?
            .as_table()
            .cloned()
            .map(DeviceEntry::from)
    }

    /// Returns all device entries in document order.
    pub fn devices(&self) -> Vec<(DeviceKey, DeviceEntry)> {
        self.section(DEVICES_KEY)
            .map(|devices| {
                devices
                    .iter()
                    .filter_map(|(key, entry)| {
                        entry
                            .as_table()
                            .map(|t| (key.clone(), DeviceEntry::from(t.clone())))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the group entry stored for `id`.
    pub fn group(&self, id: &str) -> Option<GroupEntry> {
        self.section(GROUPS_KEY)?
            .get(id)?
            .as_table()
            .cloned()
            .map(GroupEntry::from)
    }

    /// Resolves a device friendly name to its hardware address.
    ///
    /// With duplicate names the first device in document order wins.
    pub fn ieee_addr_by_friendly_name(&self, name: &str) -> Option<DeviceKey> {
        self.section(DEVICES_KEY)
            .and_then(|devices| find_by_friendly_name(devices, name))
            .map(str::to_string)
    }

    /// Resolves a group friendly name to its id.
    pub fn group_id_by_friendly_name(&self, name: &str) -> Option<GroupKey> {
        self.section(GROUPS_KEY)
            .and_then(|groups| find_by_friendly_name(groups, name))
            .map(str::to_string)
    }

    // ── Mutations ─────────────────────────────────────────────────────────────

    /// Persists the current document without reloading or notifying.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Storage`] if encoding or writing fails.
    pub fn write(&self) -> Result<(), SettingsError> {
        self.storage.save(&self.document)?;
        Ok(())
    }

    /// Assigns `value` at `path`, creating intermediate tables, then syncs.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Document`] without touching storage when the
    /// path is empty or runs through a non-table value.
    pub fn set(&mut self, path: &[&str], value: impl Into<Value>) -> Result<(), SettingsError> {
        if let Err(e) = set_path(&mut self.document, path, value.into()) {
            warn!(path = %path.join("."), "rejected settings path: {e}");
            return Err(e.into());
        }
        debug!(path = %path.join("."), "setting updated");
        self.sync()
    }

    /// Adds `key` with the default entry, replacing any existing entry.
    pub fn add_device(&mut self, key: &str) -> Result<(), SettingsError> {
        let replaced = with_table(&mut self.document, DEVICES_KEY, |devices| {
            devices
                .insert(key.to_string(), DeviceEntry::new(key).into())
                .is_some()
        });
        info!(device = key, replaced, "device added");
        self.sync()
    }

    /// Removes the entry for `key`.  Absent devices are ignored.
    pub fn remove_device(&mut self, key: &str) -> Result<(), SettingsError> {
        let removed = self
            .section_mut(DEVICES_KEY)
            .and_then(|devices| devices.remove(key))
            .is_some();
        if !removed {
            trace!(device = key, "remove ignored: no such device");
            return Ok(());
        }
        info!(device = key, "device removed");
        self.sync()
    }

    /// Renames the device currently called `old_name`.
    ///
    /// Returns `Ok(false)` with no side effects when no device has that name.
    /// `new_name` is not checked against existing names.
    pub fn change_friendly_name(
        &mut self,
        old_name: &str,
        new_name: &str,
    ) -> Result<bool, SettingsError> {
        let Some(key) = self.ieee_addr_by_friendly_name(old_name) else {
            return Ok(false);
        };
        let Some(entry) = self.device_table_mut(&key) else {
            return Ok(false);
        };
        entry.insert(FRIENDLY_NAME.to_string(), Value::String(new_name.to_string()));
        info!(device = %key, from = old_name, to = new_name, "device renamed");
        self.sync()?;
        Ok(true)
    }

    /// Updates fields already present on the entry for `key`.
    ///
    /// Only fields the entry already has are considered, and only truthy
    /// values in `options` are written: new fields are never added and a
    /// field cannot be set to a falsy value this way.  Absent devices are
    /// ignored without syncing; otherwise the store syncs even if nothing
    /// changed.
    pub fn change_device_options(&mut self, key: &str, options: &Table) -> Result<(), SettingsError> {
        let Some(entry) = self.device_table_mut(key) else {
            trace!(device = key, "options change ignored: no such device");
            return Ok(());
        };

        let mut updated = 0usize;
        for (field, current) in entry.iter_mut() {
            if let Some(value) = options.get(field).filter(|v| is_truthy(v)) {
                *current = value.clone();
                updated += 1;
            }
        }
        debug!(device = key, updated, "device options changed");
        self.sync()
    }

    /// Registers a handler run after every sync, in registration order.
    ///
    /// There is no removal; registering the same closure twice runs it twice.
    pub fn add_on_change_handler<F>(&mut self, handler: F)
    where
        F: FnMut() -> Result<(), HandlerError> + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn sync(&mut self) -> Result<(), SettingsError> {
        self.write()?;
        self.document = self.storage.load()?;
        debug!(handlers = self.handlers.len(), "settings synced");

        for (index, handler) in self.handlers.iter_mut().enumerate() {
            trace!(index, "running change handler");
            handler().map_err(|source| SettingsError::Handler { index, source })?;
        }
        Ok(())
    }

    fn section(&self, name: &str) -> Option<&Table> {
        self.document.get(name).and_then(Value::as_table)
    }

    fn section_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.document.get_mut(name).and_then(Value::as_table_mut)
    }

    fn device_table_mut(&mut self, key: &str) -> Option<&mut Table> {
        self.section_mut(DEVICES_KEY)?
            .get_mut(key)
            .and_then(Value::as_table_mut)
    }
}

/// Runs `f` on the table under `name`.  A missing or non-table value is
/// replaced by an empty table first; the key keeps its position.
fn with_table<R>(document: &mut Document, name: &str, f: impl FnOnce(&mut Table) -> R) -> R {
    let slot = document
        .entry(name.to_string())
        .or_insert_with(|| Value::Table(Table::new()));
    let mut table = match std::mem::replace(slot, Value::Boolean(false)) {
        Value::Table(table) => table,
        _ => Table::new(),
    };
    let result = f(&mut table);
    *slot = Value::Table(table);
    result
}

// ── Tests ─────────────────────────────────────────────────────────────────────
