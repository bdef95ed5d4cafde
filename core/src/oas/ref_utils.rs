#![deny(missing_docs)]

//! # Reference Utilities
//!
//! Classifies `$ref` strings and rewrites same-document pointers.
//!
//! Classification never fails: a malformed reference gets a best-effort format
//! and any real problem surfaces when the loader tries to use it.

use percent_encoding::percent_decode_str;
use std::fmt;
use url::Url;

/// The shape of a `$ref` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefFormat {
    /// Points inside the current document (`#/components/...`).
    Internal,
    /// Points into another file by relative or absolute path (`common.yaml#/...`).
    Relative,
    /// Points at an absolute URI (`https://example.com/api.yaml#/...`).
    Url,
}

impl fmt::Display for RefFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RefFormat::Internal => "internal",
            RefFormat::Relative => "relative",
            RefFormat::Url => "url",
        };
        write!(f, "{}", s)
    }
}

/// Determines the format of a reference string.
pub fn compute_ref_format(ref_str: &str) -> RefFormat {
    if ref_str.starts_with('#') {
        return RefFormat::Internal;
    }
    match Url::parse(ref_str) {
        // Single-letter schemes are Windows drive letters (`C:\specs\a.yaml`).
        Ok(url) if url.scheme().len() > 1 => RefFormat::Url,
        _ => RefFormat::Relative,
    }
}

/// True when `ref_str` points inside the document it is written in.
pub fn is_local_ref(ref_str: &str) -> bool {
    ref_str.starts_with('#')
}

/// Re-anchors a local reference onto the document at `prefix`.
///
/// Plain concatenation: no segment normalization and no detection of a
/// reference that already carries a prefix.
pub fn compute_local_ref(ref_str: &str, prefix: &str) -> String {
    format!("{}{}", prefix, ref_str)
}

/// Returns the document part of a reference: everything before the first `#`.
pub fn origin_prefix(ref_str: &str) -> &str {
    match ref_str.find('#') {
        Some(idx) => &ref_str[..idx],
        None => ref_str,
    }
}

/// Returns the fragment part of a reference (after the first `#`), if any.
pub fn fragment(ref_str: &str) -> Option<&str> {
    ref_str.find('#').map(|idx| &ref_str[idx + 1..])
}

/// Percent-decodes a URI fragment so it can be used as a JSON Pointer.
///
/// JSON Pointer escapes (`~0`, `~1`) are left for the pointer lookup.
pub fn decode_fragment(fragment: &str) -> String {
    percent_decode_str(fragment).decode_utf8_lossy().into_owned()
}
