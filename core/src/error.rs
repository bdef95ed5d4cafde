//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.

use crate::oas::cache::FragmentKind;
use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// A `$ref` whose target could not be fetched, parsed or located.
    #[from(ignore)]
    #[display("Unresolvable reference '{reference}': {reason}")]
    UnresolvableRef {
        /// The reference string as written in the document.
        reference: String,
        /// Why the loader gave up.
        reason: String,
    },

    /// A `$ref` whose target exists but is not the expected kind of fragment.
    #[from(ignore)]
    #[display("Reference '{reference}' does not resolve to a {expected}: {reason}")]
    TypeMismatch {
        /// The reference string as written in the document.
        reference: String,
        /// The fragment kind the caller asked for.
        expected: FragmentKind,
        /// Deserialization detail.
        reason: String,
    },

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

impl AppError {
    /// Shorthand for building an [`AppError::UnresolvableRef`].
    pub fn unresolvable(reference: &str, reason: impl Into<String>) -> Self {
        AppError::UnresolvableRef {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns the offending reference for reference-related failures.
    pub fn reference(&self) -> Option<&str> {
        match self {
            AppError::UnresolvableRef { reference, .. } | AppError::TypeMismatch { reference, .. } => {
                Some(reference)
            }
            _ => None,
        }
    }
}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
