#![deny(missing_docs)]

//! # Paths Processing
//!
//! Drives resolution of a document's `paths`, one entry at a time and in
//! document order:
//!
//! 1. propagate shared parameters of an inline entry, once its parameter
//!    lists are normalized;
//! 2. if the entry is a `$ref`, load it, re-anchor its local refs on the
//!    referenced document and splice it over the reference;
//! 3. normalize the parameter lists, inlining `$ref` entries;
//! 4. propagate again (covers operations that arrived with the splice);
//! 5. hand each operation to the operation processor.
//!
//! A failed load leaves the entry as the original reference.

use crate::config::ResolverSettings;
use crate::error::{AppError, AppResult};
use crate::oas::cache::{Fragment, FragmentKind, RefLoader};
use crate::oas::local_refs::LocalRefs;
use crate::oas::models::{Document, PathEntry, PathItem, RefOr};
use crate::oas::processors::{
    DefaultOperationProcessor, DefaultParameterProcessor, OperationProcessor, ParameterProcessor,
};
use crate::oas::propagation::ParameterPropagation;
use crate::oas::ref_utils::{compute_ref_format, origin_prefix};
use tracing::{debug, instrument, warn};

/// Loads `reference` as `kind` and re-anchors the fragment's local refs on the
/// document the reference points into.
pub fn load_relocated<T, F>(
    loader: &mut dyn RefLoader,
    reference: &str,
    kind: FragmentKind,
    unwrap: F,
) -> AppResult<T>
where
    T: LocalRefs,
    F: FnOnce(Fragment, &str) -> AppResult<T>,
{
    let format = compute_ref_format(reference);
    let fragment = loader.load_ref(reference, format, kind)?;
    let mut loaded = unwrap(fragment, reference)?;
    let rewritten = loaded.update_local_refs(origin_prefix(reference));
    if rewritten > 0 {
        debug!(reference, rewritten, "re-anchored local references");
    }
    Ok(loaded)
}

/// Replaces a `$ref` path entry with the loaded path item and returns it.
///
/// Inline entries are returned as they are. On failure the entry is untouched.
pub fn splice_path_entry<'e>(
    loader: &mut dyn RefLoader,
    entry: &'e mut PathEntry,
) -> AppResult<&'e mut PathItem> {
    if let Some(reference) = entry.ref_location().map(str::to_owned) {
        let item = load_relocated(loader, &reference, FragmentKind::PathItem, Fragment::into_path_item)?;
        debug!(%reference, "spliced path item");
        *entry = RefOr::T(item);
    }
    entry
        .as_inline_mut()
        .ok_or_else(|| AppError::General("path entry still holds a reference after splicing".into()))
}

/// A path entry that failed to resolve and was left as it was.
#[derive(Debug)]
pub struct SkippedPath {
    /// The path template.
    pub path: String,
    /// Why it failed.
    pub error: AppError,
}

/// Resolves every entry of a document's `paths`.
pub struct PathsProcessor<'a> {
    loader: &'a mut dyn RefLoader,
    propagation: ParameterPropagation,
    parameter_processor: Box<dyn ParameterProcessor + 'a>,
    operation_processor: Box<dyn OperationProcessor + 'a>,
}

impl<'a> PathsProcessor<'a> {
    /// Creates a driver using the default processors.
    pub fn new(loader: &'a mut dyn RefLoader, settings: &ResolverSettings) -> Self {
        Self {
            loader,
            propagation: ParameterPropagation::from_settings(settings),
            parameter_processor: Box::new(DefaultParameterProcessor),
            operation_processor: Box::new(DefaultOperationProcessor::new(settings)),
        }
    }

    /// Replaces the processor applied to path-level parameter lists.
    pub fn with_parameter_processor(mut self, processor: impl ParameterProcessor + 'a) -> Self {
        self.parameter_processor = Box::new(processor);
        self
    }

    /// Replaces the processor applied to each operation.
    pub fn with_operation_processor(mut self, processor: impl OperationProcessor + 'a) -> Self {
        self.operation_processor = Box::new(processor);
        self
    }

    /// Resolves all paths, stopping at the first failure.
    pub fn process_paths(&mut self, document: &mut Document) -> AppResult<()> {
        let Some(paths) = document.paths.as_mut() else {
            return Ok(());
        };
        for (path, entry) in paths.iter_mut() {
            self.process_path(path, entry)?;
        }
        Ok(())
    }

    /// Resolves all paths, skipping (and reporting) those that fail.
    pub fn process_paths_lenient(&mut self, document: &mut Document) -> Vec<SkippedPath> {
        let mut skipped = Vec::new();
        let Some(paths) = document.paths.as_mut() else {
            return skipped;
        };
        for (path, entry) in paths.iter_mut() {
            if let Err(error) = self.process_path(path, entry) {
                warn!(%path, %error, "skipping unresolved path");
                skipped.push(SkippedPath {
                    path: path.clone(),
                    error,
                });
            }
        }
        skipped
    }

    /// Resolves a single path entry in place.
    #[instrument(level = "debug", skip(self, entry))]
    pub fn process_path(&mut self, path: &str, entry: &mut PathEntry) -> AppResult<()> {
        if let RefOr::T(item) = entry {
            self.normalize_parameters(item)?;
            self.propagation.apply(item);
        }

        let item = splice_path_entry(&mut *self.loader, entry)?;

        self.normalize_parameters(item)?;
        self.propagation.apply(item);

        for (method, operation) in item.operations_mut() {
            debug!(%method, "processing operation");
            self.operation_processor
                .process_operation(&mut *self.loader, operation)?;
        }
        Ok(())
    }

    /// Inlines `$ref` parameters on the path and on each operation so that
    /// propagation compares declared identities, not reference strings.
    fn normalize_parameters(&mut self, item: &mut PathItem) -> AppResult<()> {
        if let Some(parameters) = item.parameters.clone() {
            item.parameters = Some(
                self.parameter_processor
                    .process_parameters(&mut *self.loader, parameters)?,
            );
        }
        if !self.propagation.is_enabled() {
            return Ok(());
        }
        for (_, operation) in item.operations_mut() {
            let parameters = operation.parameters.clone();
            operation.parameters = self
                .parameter_processor
                .process_parameters(&mut *self.loader, parameters)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::cache::ResolverCache;
    use crate::oas::models::{HttpMethod, Operation, ParameterIn, Reference};
    use crate::oas::source::MemorySource;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    const COMMON: &str = r##"
paths:
  /pets:
    parameters:
      - name: tenant
        in: header
        schema:
          $ref: '#/components/schemas/Tenant'
    get:
      parameters:
        - name: limit
          in: query
      responses:
        '200':
          description: OK
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: '#/components/schemas/Pet'
        default:
          description: Error
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Error'
"##;

    fn document(value: serde_json::Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    fn cache() -> ResolverCache {
        ResolverCache::new(json!({}), MemorySource::new().with("common.yaml", COMMON))
    }

    /// Records the schema refs each operation saw when it was processed.
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl OperationProcessor for Recorder {
        fn process_operation(&self, _loader: &mut dyn RefLoader, operation: &mut Operation) -> AppResult<()> {
            let value = serde_json::to_value(&*operation).map_err(|e| AppError::General(e.to_string()))?;
            let text = value.to_string();
            self.0.borrow_mut().push(text);
            Ok(())
        }
    }

    #[test]
    fn test_reference_entry_spliced_and_rewritten() {
        let mut doc = document(json!({
            "paths": { "/pets": { "$ref": "common.yaml#/paths/~1pets" } }
        }));
        let mut cache = cache();
        let seen = Rc::new(RefCell::new(Vec::new()));
        PathsProcessor::new(&mut cache, &ResolverSettings::default())
            .with_operation_processor(Recorder(seen.clone()))
            .process_paths(&mut doc)
            .unwrap();

        let paths = doc.paths.as_ref().unwrap();
        let item = paths["/pets"].as_inline().unwrap();
        assert!(item.parameters.is_none());

        let get = item.operation(HttpMethod::Get).unwrap();
        let names: Vec<&str> = get
            .parameters
            .iter()
            .map(|p| p.as_inline().unwrap().name.as_str())
            .collect();
        assert_eq!(names, vec!["tenant", "limit"]);

        let value = serde_json::to_value(get).unwrap();
        assert_eq!(
            value["parameters"][0]["schema"]["$ref"],
            "common.yaml#/components/schemas/Tenant"
        );
        assert_eq!(
            value["responses"]["default"]["content"]["application/json"]["schema"]["$ref"],
            "common.yaml#/components/schemas/Error"
        );

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("common.yaml#/components/schemas/Error"));
        assert!(!seen[0].contains("\"#/components/schemas/Error\""));
    }

    #[test]
    fn test_failed_splice_leaves_reference() {
        let mut doc = document(json!({
            "paths": {
                "/pets": { "$ref": "missing.yaml#/paths/~1pets" },
                "/later": { "get": { "responses": {} } }
            }
        }));
        let mut cache = cache();
        let err = PathsProcessor::new(&mut cache, &ResolverSettings::default())
            .process_paths(&mut doc)
            .unwrap_err();
        assert_eq!(err.reference(), Some("missing.yaml#/paths/~1pets"));

        let paths = doc.paths.as_ref().unwrap();
        assert_eq!(
            paths["/pets"],
            RefOr::Ref(Reference::new("missing.yaml#/paths/~1pets"))
        );
    }

    #[test]
    fn test_lenient_skips_and_continues() {
        let mut doc = document(json!({
            "paths": {
                "/broken": { "$ref": "common.yaml#/paths/~1nothing" },
                "/pets": { "$ref": "common.yaml#/paths/~1pets" }
            }
        }));
        let mut cache = cache();
        let skipped = PathsProcessor::new(&mut cache, &ResolverSettings::default())
            .process_paths_lenient(&mut doc);

        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].path, "/broken");
        let paths = doc.paths.as_ref().unwrap();
        assert!(paths["/broken"].ref_location().is_some());
        assert!(paths["/pets"].as_inline().is_some());
    }

    #[test]
    fn test_inline_entry_propagated_before_and_after() {
        let mut doc = document(json!({
            "components": { "parameters": { "Tenant": { "name": "tenant", "in": "header" } } },
            "paths": {
                "/items/{id}": {
                    "parameters": [
                        { "$ref": "#/components/parameters/Tenant" },
                        { "name": "id", "in": "path" }
                    ],
                    "get": { "parameters": [{ "name": "id", "in": "path", "required": true }] }
                }
            }
        }));
        let root = serde_json::to_value(&doc).unwrap();
        let mut cache = ResolverCache::new(root, MemorySource::new());
        PathsProcessor::new(&mut cache, &ResolverSettings::default())
            .process_paths(&mut doc)
            .unwrap();

        let item = doc.paths.as_ref().unwrap()["/items/{id}"].as_inline().unwrap();
        assert!(item.parameters.is_none());
        let get = item.get.as_ref().unwrap();
        let params: Vec<(&str, ParameterIn)> = get
            .parameters
            .iter()
            .map(|p| {
                let p = p.as_inline().unwrap();
                (p.name.as_str(), p.location)
            })
            .collect();
        // `id` is already declared by the operation.
        assert_eq!(params, vec![("tenant", ParameterIn::Header), ("id", ParameterIn::Path)]);
    }

    fn limit_params(doc: &Document, path: &str) -> Vec<(String, ParameterIn, serde_json::Value)> {
        let item = doc.paths.as_ref().unwrap()[path].as_inline().unwrap();
        item.get
            .as_ref()
            .unwrap()
            .parameters
            .iter()
            .map(|p| {
                let p = p.as_inline().unwrap();
                let kind = p.schema.as_ref().map_or(serde_json::Value::Null, |s| s.extra["type"].clone());
                (p.name.clone(), p.location, kind)
            })
            .collect()
    }

    #[test]
    fn test_shared_reference_matches_operation_declaration() {
        let mut doc = document(json!({
            "components": {
                "parameters": {
                    "Limit": { "name": "limit", "in": "query", "schema": { "type": "string" } }
                }
            },
            "paths": {
                "/pets": {
                    "parameters": [{ "$ref": "#/components/parameters/Limit" }],
                    "get": {
                        "parameters": [{ "name": "limit", "in": "query", "schema": { "type": "integer" } }]
                    }
                }
            }
        }));
        let root = serde_json::to_value(&doc).unwrap();
        let mut cache = ResolverCache::new(root, MemorySource::new());
        PathsProcessor::new(&mut cache, &ResolverSettings::default())
            .process_paths(&mut doc)
            .unwrap();

        assert_eq!(
            limit_params(&doc, "/pets"),
            vec![("limit".to_string(), ParameterIn::Query, json!("integer"))]
        );
    }

    #[test]
    fn test_operation_reference_matches_shared_declaration() {
        let mut doc = document(json!({
            "components": {
                "parameters": {
                    "Limit": { "name": "limit", "in": "query", "schema": { "type": "integer" } }
                }
            },
            "paths": {
                "/pets": {
                    "parameters": [{ "name": "limit", "in": "query", "schema": { "type": "string" } }],
                    "get": { "parameters": [{ "$ref": "#/components/parameters/Limit" }] }
                }
            }
        }));
        let root = serde_json::to_value(&doc).unwrap();
        let mut cache = ResolverCache::new(root, MemorySource::new());
        PathsProcessor::new(&mut cache, &ResolverSettings::default())
            .process_paths(&mut doc)
            .unwrap();

        assert_eq!(
            limit_params(&doc, "/pets"),
            vec![("limit".to_string(), ParameterIn::Query, json!("integer"))]
        );
    }

    #[test]
    fn test_propagation_disabled_keeps_shared_list() {
        let mut doc = document(json!({
            "paths": { "/pets": { "$ref": "common.yaml#/paths/~1pets" } }
        }));
        let mut cache = cache();
        let settings = ResolverSettings::default().with_parameter_propagation(false);
        PathsProcessor::new(&mut cache, &settings)
            .process_paths(&mut doc)
            .unwrap();

        let item = doc.paths.as_ref().unwrap()["/pets"].as_inline().unwrap();
        assert_eq!(item.parameters.as_ref().map(Vec::len), Some(1));
        assert_eq!(item.get.as_ref().unwrap().parameters.len(), 1);
    }

    #[test]
    fn test_document_without_paths() {
        let mut doc = document(json!({ "openapi": "3.0.3" }));
        let mut cache = cache();
        PathsProcessor::new(&mut cache, &ResolverSettings::default())
            .process_paths(&mut doc)
            .unwrap();
        assert!(doc.paths.is_none());
    }

    #[test]
    fn test_same_reference_loaded_once_across_paths() {
        let mut doc = document(json!({
            "paths": {
                "/pets": { "$ref": "common.yaml#/paths/~1pets" },
                "/animals": { "$ref": "common.yaml#/paths/~1pets" }
            }
        }));
        let mut cache = cache();
        PathsProcessor::new(&mut cache, &ResolverSettings::default())
            .process_paths(&mut doc)
            .unwrap();
        assert_eq!(cache.fetch_count(), 1);
        let paths = doc.paths.as_ref().unwrap();
        assert_eq!(paths["/pets"], paths["/animals"]);
    }
}
