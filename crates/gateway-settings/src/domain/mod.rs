//! Domain logic for the settings store.
//!
//! Nothing in this module touches the file system or the environment.  It
//! defines the document value model (a string-keyed TOML table), the merge
//! used to layer a document over the compiled-in defaults, and typed views of
//! the device and group entries held inside a document.
//!
//! The application layer (`SettingsStore`) composes these pieces with a
//! storage adapter; the domain never depends on either.

/// Compiled-in baseline configuration.
pub mod defaults;
/// Document tree helpers: merge, path assignment, truthiness.
pub mod document;
/// Device and group entry views.
pub mod entities;
