#![deny(missing_docs)]

//! # Resolver Cache
//!
//! The fragment loader used by the resolution engine. A [`RefLoader`] maps a
//! `$ref` string and an expected [`FragmentKind`] to a typed [`Fragment`].
//!
//! [`ResolverCache`] is scoped to one document-resolution session. It memoizes
//! by the exact reference string, so repeated references are loaded once and
//! mutually referencing documents cannot trigger repeated fetches.

use crate::error::{AppError, AppResult};
use crate::oas::models::{Callback, Parameter, PathItem, RequestBody, Response};
use crate::oas::ref_utils::{decode_fragment, fragment, origin_prefix, RefFormat};
use crate::oas::schema::Schema;
use crate::oas::source::DocumentSource;
use derive_more::Display;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tracing::{debug, trace};

/// The kind of fragment a caller expects a reference to resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum FragmentKind {
    /// Path Item Object.
    #[display("path item")]
    PathItem,
    /// Parameter Object.
    #[display("parameter")]
    Parameter,
    /// Request Body Object.
    #[display("request body")]
    RequestBody,
    /// Response Object.
    #[display("response")]
    Response,
    /// Callback Object.
    #[display("callback")]
    Callback,
    /// Schema Object.
    #[display("schema")]
    Schema,
}

/// A deserialized fragment obtained by resolving a reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Path Item Object.
    PathItem(PathItem),
    /// Parameter Object.
    Parameter(Parameter),
    /// Request Body Object.
    RequestBody(RequestBody),
    /// Response Object.
    Response(Response),
    /// Callback Object.
    Callback(Callback),
    /// Schema Object.
    Schema(Schema),
}

impl Fragment {
    /// Deserializes `value` as the given kind.
    pub fn from_value(kind: FragmentKind, value: JsonValue) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            FragmentKind::PathItem => Fragment::PathItem(serde_json::from_value(value)?),
            FragmentKind::Parameter => Fragment::Parameter(serde_json::from_value(value)?),
            FragmentKind::RequestBody => Fragment::RequestBody(serde_json::from_value(value)?),
            FragmentKind::Response => Fragment::Response(serde_json::from_value(value)?),
            FragmentKind::Callback => Fragment::Callback(serde_json::from_value(value)?),
            FragmentKind::Schema => Fragment::Schema(serde_json::from_value(value)?),
        })
    }

    /// The kind of this fragment.
    pub fn kind(&self) -> FragmentKind {
        match self {
            Fragment::PathItem(_) => FragmentKind::PathItem,
            Fragment::Parameter(_) => FragmentKind::Parameter,
            Fragment::RequestBody(_) => FragmentKind::RequestBody,
            Fragment::Response(_) => FragmentKind::Response,
            Fragment::Callback(_) => FragmentKind::Callback,
            Fragment::Schema(_) => FragmentKind::Schema,
        }
    }

    /// Unwraps a path item, or reports a mismatch against `reference`.
    pub fn into_path_item(self, reference: &str) -> AppResult<PathItem> {
        match self {
            Fragment::PathItem(item) => Ok(item),
            other => Err(other.mismatch(reference, FragmentKind::PathItem)),
        }
    }

    /// Unwraps a parameter, or reports a mismatch against `reference`.
    pub fn into_parameter(self, reference: &str) -> AppResult<Parameter> {
        match self {
            Fragment::Parameter(param) => Ok(param),
            other => Err(other.mismatch(reference, FragmentKind::Parameter)),
        }
    }

    /// Unwraps a request body, or reports a mismatch against `reference`.
    pub fn into_request_body(self, reference: &str) -> AppResult<RequestBody> {
        match self {
            Fragment::RequestBody(body) => Ok(body),
            other => Err(other.mismatch(reference, FragmentKind::RequestBody)),
        }
    }

    /// Unwraps a response, or reports a mismatch against `reference`.
    pub fn into_response(self, reference: &str) -> AppResult<Response> {
        match self {
            Fragment::Response(response) => Ok(response),
            other => Err(other.mismatch(reference, FragmentKind::Response)),
        }
    }

    /// Unwraps a callback, or reports a mismatch against `reference`.
    pub fn into_callback(self, reference: &str) -> AppResult<Callback> {
        match self {
            Fragment::Callback(callback) => Ok(callback),
            other => Err(other.mismatch(reference, FragmentKind::Callback)),
        }
    }

    fn mismatch(&self, reference: &str, expected: FragmentKind) -> AppError {
        AppError::TypeMismatch {
            reference: reference.to_string(),
            expected,
            reason: format!("loader returned a {}", self.kind()),
        }
    }
}

/// Resolves reference strings to typed fragments.
pub trait RefLoader {
    /// Loads the fragment `reference` points at, typed as `kind`.
    ///
    /// Fails with [`AppError::UnresolvableRef`] when the target cannot be
    /// fetched, parsed or located and with [`AppError::TypeMismatch`] when it
    /// does not deserialize as `kind`.
    fn load_ref(
        &mut self,
        reference: &str,
        format: RefFormat,
        kind: FragmentKind,
    ) -> AppResult<Fragment>;
}

/// Session-scoped caching loader.
pub struct ResolverCache {
    root: JsonValue,
    source: Box<dyn DocumentSource>,
    documents: HashMap<String, JsonValue>,
    resolutions: HashMap<String, Fragment>,
    fetches: usize,
}

impl ResolverCache {
    /// Creates a cache for the host document `root`, fetching other documents from `source`.
    pub fn new(root: JsonValue, source: impl DocumentSource + 'static) -> Self {
        Self {
            root,
            source: Box::new(source),
            documents: HashMap::new(),
            resolutions: HashMap::new(),
            fetches: 0,
        }
    }

    /// Number of external documents fetched so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    /// True when `reference` has already been resolved in this session.
    pub fn is_cached(&self, reference: &str) -> bool {
        self.resolutions.contains_key(reference)
    }

    fn ensure_document(&mut self, location: &str, reference: &str) -> AppResult<()> {
        if self.documents.contains_key(location) {
            return Ok(());
        }
        debug!(location, "fetching external document");
        let text = self.source.fetch(location).map_err(|e| match e {
            AppError::UnresolvableRef { reason, .. } => AppError::unresolvable(reference, reason),
            other => other,
        })?;
        self.fetches += 1;
        let value: JsonValue = serde_yaml::from_str(&text).map_err(|e| {
            AppError::unresolvable(reference, format!("failed to parse '{}': {}", location, e))
        })?;
        self.documents.insert(location.to_string(), value);
        Ok(())
    }
}

impl RefLoader for ResolverCache {
    fn load_ref(
        &mut self,
        reference: &str,
        format: RefFormat,
        kind: FragmentKind,
    ) -> AppResult<Fragment> {
        if let Some(cached) = self.resolutions.get(reference) {
            if cached.kind() != kind {
                return Err(AppError::TypeMismatch {
                    reference: reference.to_string(),
                    expected: kind,
                    reason: format!("already resolved as a {}", cached.kind()),
                });
            }
            trace!(reference, "reference served from cache");
            return Ok(cached.clone());
        }

        debug!(reference, %format, %kind, "loading reference");
        let location = origin_prefix(reference);
        if format != RefFormat::Internal {
            self.ensure_document(location, reference)?;
        }
        let document = match format {
            RefFormat::Internal => &self.root,
            _ => &self.documents[location],
        };

        let pointer = fragment(reference).map(decode_fragment).unwrap_or_default();
        let target = document.pointer(&pointer).cloned().ok_or_else(|| {
            AppError::unresolvable(reference, format!("no value at pointer '{}'", pointer))
        })?;

        let loaded = Fragment::from_value(kind, target).map_err(|e| AppError::TypeMismatch {
            reference: reference.to_string(),
            expected: kind,
            reason: e.to_string(),
        })?;
        self.resolutions.insert(reference.to_string(), loaded.clone());
        Ok(loaded)
    }
}
