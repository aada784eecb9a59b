//! Application layer: the settings store.
//!
//! [`settings_store::SettingsStore`] composes the live document, the
//! defaults, the change-handler registry and a storage adapter.  It depends
//! on storage only through the `DocumentStorage` trait, so tests run it
//! against `MemoryStorage` and production against `FileStorage`.

pub mod settings_store;
