#![deny(missing_docs)]

//! # Resolver Configuration
//!
//! Settings that steer how the resolver restructures a document. Every field
//! has a default so partial YAML/JSON files are accepted.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Options recognized by the reference resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolverSettings {
    /// Copy path-level parameters into every operation and drop them from the path.
    ///
    /// When `false` the shared list stays on the path item for downstream consumers.
    pub add_parameters_to_each_operation: bool,
    /// Load and splice `$ref` callbacks and the path items they contain.
    pub resolve_callbacks: bool,
    /// Replace `$ref` request bodies with the referenced body.
    pub resolve_request_bodies: bool,
    /// Replace `$ref` responses with the referenced response.
    pub resolve_responses: bool,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            add_parameters_to_each_operation: true,
            resolve_callbacks: true,
            resolve_request_bodies: true,
            resolve_responses: true,
        }
    }
}

impl ResolverSettings {
    /// Parses settings from YAML (or JSON) text.
    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| AppError::General(format!("Failed to parse resolver settings: {}", e)))
    }

    /// Loads settings from a YAML or JSON file.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Builder-style toggle for parameter propagation.
    pub fn with_parameter_propagation(mut self, enabled: bool) -> Self {
        self.add_parameters_to_each_operation = enabled;
        self
    }
}
