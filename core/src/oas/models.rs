#![deny(missing_docs)]

//! # Document Model
//!
//! Typed view of the parts of an OpenAPI document that the resolver walks:
//! paths, operations, parameters, bodies, responses, callbacks and schemas.
//!
//! Every struct keeps members it does not model in a flattened `extra` map so
//! a resolved document serializes back without losing information.

use crate::oas::schema::Schema;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Loosely typed members preserved verbatim.
pub type Extra = IndexMap<String, JsonValue>;

/// A Reference Object (`{"$ref": "..."}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    /// The reference target as written.
    #[serde(rename = "$ref")]
    pub ref_location: String,
    /// Sibling keys such as `summary` and `description`.
    #[serde(flatten)]
    pub extra: Extra,
}

impl Reference {
    /// Creates a reference to `location`.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            ref_location: location.into(),
            extra: Extra::new(),
        }
    }
}

/// Either a Reference Object or an inline value.
///
/// An object carrying `$ref` is always read as [`RefOr::Ref`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    /// A `$ref` placeholder.
    Ref(Reference),
    /// Inline content.
    T(T),
}

impl<T> RefOr<T> {
    /// Returns the inline value, if any.
    pub fn as_inline(&self) -> Option<&T> {
        match self {
            RefOr::T(t) => Some(t),
            RefOr::Ref(_) => None,
        }
    }

    /// Returns the inline value mutably, if any.
    pub fn as_inline_mut(&mut self) -> Option<&mut T> {
        match self {
            RefOr::T(t) => Some(t),
            RefOr::Ref(_) => None,
        }
    }

    /// Returns the `$ref` target, if this is a reference.
    pub fn ref_location(&self) -> Option<&str> {
        match self {
            RefOr::Ref(r) => Some(&r.ref_location),
            RefOr::T(_) => None,
        }
    }
}

/// A path entry is either a `$ref` or an inline Path Item.
pub type PathEntry = RefOr<PathItem>;

/// A Callback Object: runtime expression to path entry.
pub type Callback = IndexMap<String, PathEntry>;

/// Root of an OpenAPI document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// OpenAPI version string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openapi: Option<String>,
    /// Path template to path entry, in document order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<IndexMap<String, PathEntry>>,
    /// Everything else (`info`, `components`, `servers`, extensions, ...).
    #[serde(flatten)]
    pub extra: Extra,
}

/// HTTP methods a Path Item can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    /// GET
    Get,
    /// PUT
    Put,
    /// POST
    Post,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
    /// HEAD
    Head,
    /// PATCH
    Patch,
    /// TRACE
    Trace,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        };
        write!(f, "{}", s)
    }
}

/// A Path Item Object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathItem {
    /// Parameters shared by every operation on this path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<RefOr<Parameter>>>,
    /// GET operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// PUT operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// POST operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// DELETE operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// OPTIONS operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    /// PATCH operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// TRACE operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
    /// `summary`, `description`, `servers`, extensions.
    #[serde(flatten)]
    pub extra: Extra,
}

impl PathItem {
    /// Iterates the operations present, in method order.
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        [
            (HttpMethod::Get, &self.get),
            (HttpMethod::Put, &self.put),
            (HttpMethod::Post, &self.post),
            (HttpMethod::Delete, &self.delete),
            (HttpMethod::Options, &self.options),
            (HttpMethod::Head, &self.head),
            (HttpMethod::Patch, &self.patch),
            (HttpMethod::Trace, &self.trace),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|o| (method, o)))
    }

    /// Iterates the operations present mutably, in method order.
    pub fn operations_mut(&mut self) -> impl Iterator<Item = (HttpMethod, &mut Operation)> {
        [
            (HttpMethod::Get, &mut self.get),
            (HttpMethod::Put, &mut self.put),
            (HttpMethod::Post, &mut self.post),
            (HttpMethod::Delete, &mut self.delete),
            (HttpMethod::Options, &mut self.options),
            (HttpMethod::Head, &mut self.head),
            (HttpMethod::Patch, &mut self.patch),
            (HttpMethod::Trace, &mut self.trace),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_mut().map(|o| (method, o)))
    }

    /// Returns the operation bound to `method`.
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        self.operations()
            .find(|(m, _)| *m == method)
            .map(|(_, op)| op)
    }

    /// Returns true if no HTTP method carries an operation.
    pub fn has_operations(&self) -> bool {
        self.operations().next().is_some()
    }
}

/// An Operation Object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Operation {
    /// Parameters declared by this operation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<RefOr<Parameter>>,
    /// Request body.
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RefOr<RequestBody>>,
    /// Status key (`200`, `default`, `4XX`) to response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses: Option<IndexMap<String, RefOr<Response>>>,
    /// Callback name to callback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callbacks: Option<IndexMap<String, RefOr<Callback>>>,
    /// `operationId`, `tags`, `security`, extensions, ...
    #[serde(flatten)]
    pub extra: Extra,
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    /// `?name=value`
    Query,
    /// Request header.
    Header,
    /// Templated path segment.
    Path,
    /// Cookie.
    Cookie,
}

/// A Parameter Object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Parameter location.
    #[serde(rename = "in")]
    pub location: ParameterIn,
    /// Whether the parameter is mandatory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// Schema describing the value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    /// Media-type keyed serialization (mutually exclusive with `schema` in valid documents).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
    /// `description`, `style`, `explode`, examples, extensions.
    #[serde(flatten)]
    pub extra: Extra,
}

impl Parameter {
    /// Creates a parameter with no schema.
    pub fn new(name: impl Into<String>, location: ParameterIn) -> Self {
        Self {
            name: name.into(),
            location,
            required: None,
            schema: None,
            content: None,
            extra: Extra::new(),
        }
    }

    /// Builder-style schema setter.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// True when both declare the same parameter: same location and same name.
    pub fn same_identity(&self, other: &Parameter) -> bool {
        self.location == other.location && self.name == other.name
    }
}

/// A Media Type Object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema of the payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    /// `example`, `examples`, `encoding`, extensions.
    #[serde(flatten)]
    pub extra: Extra,
}

/// A Request Body Object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestBody {
    /// Media type to payload description.
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
    /// `description`, `required`, extensions.
    #[serde(flatten)]
    pub extra: Extra,
}

/// A Response Object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Response {
    /// Media type to payload description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
    /// `description`, `headers`, `links`, extensions.
    #[serde(flatten)]
    pub extra: Extra,
}

/// Builds a `content` map with a single media type carrying `schema`.
#[cfg(test)]
pub(crate) fn single_content(media_type: &str, schema: Schema) -> IndexMap<String, MediaType> {
    let mut content = IndexMap::new();
    content.insert(
        media_type.to_string(),
        MediaType {
            schema: Some(schema),
            extra: Extra::new(),
        },
    );
    content
}
