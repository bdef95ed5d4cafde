#![deny(missing_docs)]

//! # OpenAPI Reference Resolution
//!
//! - **models** / **schema**: typed document model.
//! - **ref_utils**: reference classification and rewriting helpers.
//! - **source** / **cache**: fragment loading with per-session memoization.
//! - **local_refs**: re-anchors local refs of loaded fragments.
//! - **propagation**: distributes shared path parameters.
//! - **processors**: parameter and operation collaborators.
//! - **paths**: the per-path resolution driver.
//! - **resolver**: top-level entry point.

pub mod cache;
pub mod local_refs;
pub mod models;
pub mod paths;
pub mod processors;
pub mod propagation;
pub mod ref_utils;
pub mod resolver;
pub mod schema;
pub mod source;

pub use cache::{Fragment, FragmentKind, RefLoader, ResolverCache};
pub use local_refs::LocalRefs;
pub use models::{
    Callback, Document, HttpMethod, MediaType, Operation, Parameter, ParameterIn, PathEntry,
    PathItem, RefOr, Reference, RequestBody, Response,
};
pub use paths::{load_relocated, splice_path_entry, PathsProcessor, SkippedPath};
pub use processors::{
    DefaultOperationProcessor, DefaultParameterProcessor, OperationProcessor, ParameterProcessor,
};
pub use propagation::ParameterPropagation;
pub use ref_utils::{compute_local_ref, compute_ref_format, is_local_ref, origin_prefix, RefFormat};
pub use resolver::{parse_document, OpenApiResolver, Resolution};
pub use schema::{Schema, SchemaKind};
pub use source::{DocumentSource, FileSource, MemorySource};
