//! TOML file persistence.
//!
//! The whole document is encoded with `toml::to_string_pretty` and written
//! over the previous file contents; loading decodes the whole file.  A
//! missing file is an error: the store never substitutes defaults for a file
//! it cannot read.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{DocumentStorage, StorageError};
use crate::domain::document::Document;

/// [`DocumentStorage`] backed by a single TOML file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` when the backing file exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

impl DocumentStorage for FileStorage {
    fn load(&self) -> Result<Document, StorageError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;
        let document: Document = toml::from_str(&content)?;
        debug!(path = %self.path.display(), keys = document.len(), "configuration loaded");
        Ok(document)
    }

    fn save(&self, document: &Document) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| StorageError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let content = toml::to_string_pretty(document)?;
        std::fs::write(&self.path, content).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "configuration written");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
