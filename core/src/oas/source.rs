#![deny(missing_docs)]

//! # Document Sources
//!
//! Where the loader reads external documents from. No network access is
//! performed: remote URLs are only served when pre-registered in a
//! [`MemorySource`].

use crate::error::{AppError, AppResult};
use crate::oas::ref_utils::{compute_ref_format, RefFormat};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Fetches the raw text of a document by location (the part of a `$ref` before `#`).
pub trait DocumentSource {
    /// Returns the document text at `location`.
    fn fetch(&self, location: &str) -> AppResult<String>;
}

/// Reads documents from disk, relative to a base directory.
#[derive(Debug, Clone)]
pub struct FileSource {
    base_dir: PathBuf,
}

impl FileSource {
    /// Resolves relative locations against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// The directory relative locations are resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_for(&self, location: &str) -> PathBuf {
        let path = Path::new(location);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

impl DocumentSource for FileSource {
    fn fetch(&self, location: &str) -> AppResult<String> {
        if compute_ref_format(location) == RefFormat::Url {
            return Err(AppError::unresolvable(
                location,
                "remote documents are not fetched by the file source",
            ));
        }
        let path = self.path_for(location);
        fs::read_to_string(&path)
            .map_err(|e| AppError::unresolvable(location, format!("{}: {}", path.display(), e)))
    }
}

/// Serves pre-registered documents keyed by location.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<String, String>,
}

impl MemorySource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `content` under `location`.
    pub fn insert(&mut self, location: impl Into<String>, content: impl Into<String>) {
        self.documents.insert(location.into(), content.into());
    }

    /// Builder-style [`MemorySource::insert`].
    pub fn with(mut self, location: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(location, content);
        self
    }
}

impl DocumentSource for MemorySource {
    fn fetch(&self, location: &str) -> AppResult<String> {
        self.documents
            .get(location)
            .cloned()
            .ok_or_else(|| AppError::unresolvable(location, "document not registered"))
    }
}
