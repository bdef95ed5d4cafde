#![deny(missing_docs)]

//! # OpenAPI Resolver
//!
//! Entry point tying parsing, the session cache and the paths driver together.

use crate::config::ResolverSettings;
use crate::error::{AppError, AppResult};
use crate::oas::cache::{RefLoader, ResolverCache};
use crate::oas::models::Document;
use crate::oas::paths::{PathsProcessor, SkippedPath};
use crate::oas::source::{DocumentSource, FileSource};
use serde_json::Value as JsonValue;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Parses YAML or JSON text into a raw JSON value.
pub fn parse_document_value(content: &str) -> AppResult<JsonValue> {
    serde_yaml::from_str(content)
        .map_err(|e| AppError::General(format!("Failed to parse OpenAPI YAML: {}", e)))
}

/// Converts a raw JSON value into the typed document model.
pub fn document_from_value(value: JsonValue) -> AppResult<Document> {
    serde_json::from_value(value)
        .map_err(|e| AppError::General(format!("Failed to read OpenAPI document: {}", e)))
}

/// Parses YAML or JSON text into the typed document model.
pub fn parse_document(content: &str) -> AppResult<Document> {
    document_from_value(parse_document_value(content)?)
}

/// The outcome of a lenient resolution.
#[derive(Debug)]
pub struct Resolution {
    /// The resolved document; skipped paths keep their original entry.
    pub document: Document,
    /// Paths that could not be resolved.
    pub skipped: Vec<SkippedPath>,
}

/// Resolves `$ref`s of path entries into a single document.
#[derive(Debug, Clone, Default)]
pub struct OpenApiResolver {
    settings: ResolverSettings,
}

impl OpenApiResolver {
    /// Creates a resolver with the given settings.
    pub fn new(settings: ResolverSettings) -> Self {
        Self { settings }
    }

    /// The settings in use.
    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Resolves an already parsed document with a caller-supplied loader.
    pub fn resolve_document(&self, document: &mut Document, loader: &mut dyn RefLoader) -> AppResult<()> {
        PathsProcessor::new(loader, &self.settings).process_paths(document)
    }

    /// Parses `content` and resolves it, fetching external documents from `source`.
    ///
    /// Stops at the first path that fails to resolve.
    pub fn resolve_str(&self, content: &str, source: impl DocumentSource + 'static) -> AppResult<Document> {
        let (mut document, mut cache) = self.prepare(content, source)?;
        self.resolve_document(&mut document, &mut cache)?;
        debug!(fetched = cache.fetch_count(), "document resolved");
        Ok(document)
    }

    /// Like [`OpenApiResolver::resolve_str`] but skips paths that fail to resolve.
    pub fn resolve_str_lenient(
        &self,
        content: &str,
        source: impl DocumentSource + 'static,
    ) -> AppResult<Resolution> {
        let (mut document, mut cache) = self.prepare(content, source)?;
        let skipped = PathsProcessor::new(&mut cache, &self.settings).process_paths_lenient(&mut document);
        debug!(fetched = cache.fetch_count(), skipped = skipped.len(), "document resolved");
        Ok(Resolution { document, skipped })
    }

    /// Reads and resolves the file at `path`; relative refs resolve against its directory.
    pub fn resolve_file(&self, path: &Path) -> AppResult<Document> {
        let content = fs::read_to_string(path)?;
        self.resolve_str(&content, FileSource::new(base_dir_of(path)))
    }

    fn prepare(
        &self,
        content: &str,
        source: impl DocumentSource + 'static,
    ) -> AppResult<(Document, ResolverCache)> {
        let raw = parse_document_value(content)?;
        let document = document_from_value(raw.clone())?;
        Ok((document, ResolverCache::new(raw, source)))
    }
}

/// The directory relative references in `path` are resolved against.
pub fn base_dir_of(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
