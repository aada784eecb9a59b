//! Storage infrastructure: load/save of the configuration document.
//!
//! The store only ever needs two things from persistence: read the whole
//! document, and overwrite it with a whole new document.  That contract is
//! the [`DocumentStorage`] trait.  [`file::FileStorage`] is the production
//! adapter; [`memory::MemoryStorage`] keeps the encoded text in memory so
//! tests can exercise the full write-then-reload cycle without a disk.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::document::Document;

pub mod file;
pub mod memory;

/// Error type for document persistence.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The platform data directory could not be determined.
    #[error("could not determine platform data directory")]
    NoPlatformDataDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing configuration at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The persisted document could not be decoded.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The document could not be encoded.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Whole-document persistence.
///
/// Implementations must overwrite on save (never append) and decode the
/// complete document on load.
pub trait DocumentStorage {
    /// Reads and decodes the persisted document.
    fn load(&self) -> Result<Document, StorageError>;
    /// Encodes `document` and replaces the persisted copy with it.
    fn save(&self, document: &Document) -> Result<(), StorageError>;
}
