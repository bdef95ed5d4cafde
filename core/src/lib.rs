#![deny(missing_docs)]

//! # OAS Deref Core
//!
//! Resolves `$ref` pointers of an OpenAPI document's paths into a single,
//! self-consistent document: referenced path items are loaded and spliced in,
//! local refs inside them are re-anchored on their source document, and shared
//! path parameters are distributed to each operation.

/// Shared error types.
pub mod error;

/// Resolver settings.
pub mod config;

/// OpenAPI (OAS) reference resolution.
pub mod oas;

pub use config::ResolverSettings;
pub use error::{AppError, AppResult};
pub use oas::{
    parse_document, Document, MemorySource, FileSource, OpenApiResolver, PathsProcessor,
    ResolverCache, Resolution,
};
