#![deny(missing_docs)]

//! # Local Reference Rewriting
//!
//! A fragment loaded from `models.yaml#/...` may contain pointers such as
//! `#/components/schemas/Pet` that mean "elsewhere in models.yaml". Once the
//! fragment is spliced into the host document those pointers would silently
//! retarget the host, so every local `$ref` inside the fragment is re-anchored
//! as `models.yaml#/components/schemas/Pet` before the splice.
//!
//! Non-local references are left alone: they resolve the same wherever the
//! fragment ends up.

use crate::oas::models::{
    MediaType, Operation, Parameter, PathItem, RefOr, Reference, RequestBody, Response,
};
use crate::oas::ref_utils::{compute_local_ref, is_local_ref};
use crate::oas::schema::{Schema, SchemaKind};
use indexmap::IndexMap;
use tracing::trace;

/// Rewrites same-document references nested inside a fragment.
pub trait LocalRefs {
    /// Prefixes every local `$ref` reachable from `self` with `prefix`.
    ///
    /// Returns the number of references rewritten.
    fn update_local_refs(&mut self, prefix: &str) -> usize;
}

fn rewrite(ref_location: &mut String, prefix: &str) -> usize {
    if prefix.is_empty() || !is_local_ref(ref_location) {
        return 0;
    }
    let rewritten = compute_local_ref(ref_location, prefix);
    trace!(from = %ref_location, to = %rewritten, "rewrote local reference");
    *ref_location = rewritten;
    1
}

impl LocalRefs for Reference {
    fn update_local_refs(&mut self, prefix: &str) -> usize {
        rewrite(&mut self.ref_location, prefix)
    }
}

impl<T: LocalRefs> LocalRefs for RefOr<T> {
    fn update_local_refs(&mut self, prefix: &str) -> usize {
        match self {
            RefOr::Ref(reference) => reference.update_local_refs(prefix),
            RefOr::T(inner) => inner.update_local_refs(prefix),
        }
    }
}

impl<T: LocalRefs> LocalRefs for Vec<T> {
    fn update_local_refs(&mut self, prefix: &str) -> usize {
        self.iter_mut().map(|item| item.update_local_refs(prefix)).sum()
    }
}

impl<T: LocalRefs> LocalRefs for IndexMap<String, T> {
    fn update_local_refs(&mut self, prefix: &str) -> usize {
        self.values_mut().map(|item| item.update_local_refs(prefix)).sum()
    }
}

impl<T: LocalRefs> LocalRefs for Option<T> {
    fn update_local_refs(&mut self, prefix: &str) -> usize {
        self.as_mut().map_or(0, |inner| inner.update_local_refs(prefix))
    }
}

impl LocalRefs for PathItem {
    fn update_local_refs(&mut self, prefix: &str) -> usize {
        let mut count = self.parameters.update_local_refs(prefix);
        for (_, operation) in self.operations_mut() {
            count += operation.update_local_refs(prefix);
        }
        count
    }
}

impl LocalRefs for Operation {
    fn update_local_refs(&mut self, prefix: &str) -> usize {
        // Callbacks hold whole path entries, so this recurses back into `PathItem`.
        self.parameters.update_local_refs(prefix)
            + self.responses.update_local_refs(prefix)
            + self.request_body.update_local_refs(prefix)
            + self.callbacks.update_local_refs(prefix)
    }
}

impl LocalRefs for Parameter {
    fn update_local_refs(&mut self, prefix: &str) -> usize {
        self.schema.update_local_refs(prefix) + self.content.update_local_refs(prefix)
    }
}

impl LocalRefs for Response {
    fn update_local_refs(&mut self, prefix: &str) -> usize {
        self.content.update_local_refs(prefix)
    }
}

impl LocalRefs for RequestBody {
    fn update_local_refs(&mut self, prefix: &str) -> usize {
        self.content.update_local_refs(prefix)
    }
}

impl LocalRefs for MediaType {
    fn update_local_refs(&mut self, prefix: &str) -> usize {
        self.schema.update_local_refs(prefix)
    }
}

impl LocalRefs for Schema {
    fn update_local_refs(&mut self, prefix: &str) -> usize {
        match &mut self.kind {
            SchemaKind::Ref(ref_location) => rewrite(ref_location, prefix),
            SchemaKind::Object(properties) => properties.update_local_refs(prefix),
            SchemaKind::AllOf(members) | SchemaKind::AnyOf(members) | SchemaKind::OneOf(members) => {
                members.update_local_refs(prefix)
            }
            SchemaKind::Array(items) => items.as_deref_mut().map_or(0, |s| s.update_local_refs(prefix)),
            SchemaKind::Boolean(_) | SchemaKind::Leaf => 0,
        }
    }
}
