#![deny(missing_docs)]

//! # Parameter Propagation
//!
//! Distributes path-level shared parameters into each operation on the path.
//!
//! The configuration flag is read once, when the step is built from
//! [`ResolverSettings`]; [`ParameterPropagation::apply`] is the only place that
//! restructures a path item's parameters.

use crate::config::ResolverSettings;
use crate::oas::models::{Parameter, PathItem, RefOr};
use tracing::debug;

/// Single-shot transformation moving shared parameters into operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterPropagation {
    enabled: bool,
}

impl ParameterPropagation {
    /// Builds the step from the resolver settings.
    pub fn from_settings(settings: &ResolverSettings) -> Self {
        Self {
            enabled: settings.add_parameters_to_each_operation,
        }
    }

    /// A step that never changes anything.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    /// Whether the step is active.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Copies each shared parameter into every operation that does not already
    /// declare one with the same location and name, then clears the shared list.
    ///
    /// Added parameters go to the front of the operation's list, in the order
    /// they appear on the path. No-op when disabled, when there are no shared
    /// parameters, or when the path has no operations. Returns the number of
    /// parameters inserted.
    pub fn apply(&self, path_item: &mut PathItem) -> usize {
        if !self.enabled || !path_item.has_operations() {
            return 0;
        }
        let shared = match path_item.parameters.take() {
            Some(shared) if !shared.is_empty() => shared,
            other => {
                path_item.parameters = other;
                return 0;
            }
        };

        let mut inserted = 0;
        for (method, operation) in path_item.operations_mut() {
            let to_add: Vec<RefOr<Parameter>> = shared
                .iter()
                .filter(|candidate| {
                    !operation
                        .parameters
                        .iter()
                        .any(|existing| same_declared_parameter(candidate, existing))
                })
                .cloned()
                .collect();
            if to_add.is_empty() {
                continue;
            }
            debug!(%method, count = to_add.len(), "adding shared parameters to operation");
            inserted += to_add.len();
            operation.parameters.splice(0..0, to_add);
        }
        inserted
    }
}

/// Two entries declare the same parameter when both are inline and share
/// location and name. Unresolved `$ref` entries never match.
pub fn same_declared_parameter(a: &RefOr<Parameter>, b: &RefOr<Parameter>) -> bool {
    match (a, b) {
        (RefOr::T(a), RefOr::T(b)) => a.same_identity(b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::models::{Operation, ParameterIn, Reference};
    use crate::oas::schema::Schema;
    use pretty_assertions::assert_eq;

    fn inline(name: &str, location: ParameterIn) -> RefOr<Parameter> {
        RefOr::T(Parameter::new(name, location))
    }

    fn names(operation: &Operation) -> Vec<String> {
        operation
            .parameters
            .iter()
            .map(|p| match p {
                RefOr::T(p) => p.name.clone(),
                RefOr::Ref(r) => r.ref_location.clone(),
            })
            .collect()
    }

    fn enabled() -> ParameterPropagation {
        ParameterPropagation::from_settings(&ResolverSettings::default())
    }

    fn path_with(shared: Vec<RefOr<Parameter>>, op_params: Vec<RefOr<Parameter>>) -> PathItem {
        PathItem {
            parameters: Some(shared),
            get: Some(Operation {
                parameters: op_params.clone(),
                ..Default::default()
            }),
            post: Some(Operation {
                parameters: op_params,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_shared_parameters_prepended_in_order() {
        let mut item = path_with(
            vec![inline("tenant", ParameterIn::Header), inline("page", ParameterIn::Query)],
            vec![inline("id", ParameterIn::Path)],
        );
        assert_eq!(enabled().apply(&mut item), 4);
        assert_eq!(names(item.get.as_ref().unwrap()), vec!["tenant", "page", "id"]);
        assert_eq!(names(item.post.as_ref().unwrap()), vec!["tenant", "page", "id"]);
        assert!(item.parameters.is_none());
    }

    #[test]
    fn test_operation_declaration_takes_precedence() {
        let shared_limit = Parameter::new("limit", ParameterIn::Query).with_schema(Schema::leaf("string"));
        let own_limit = Parameter::new("limit", ParameterIn::Query).with_schema(Schema::leaf("integer"));
        let mut item = path_with(
            vec![RefOr::T(shared_limit)],
            vec![RefOr::T(own_limit.clone())],
        );

        enabled().apply(&mut item);

        let get = item.get.as_ref().unwrap();
        assert_eq!(get.parameters.len(), 1);
        assert_eq!(get.parameters[0], RefOr::T(own_limit));
    }

    #[test]
    fn test_same_name_different_location_is_added() {
        let mut item = path_with(
            vec![inline("id", ParameterIn::Header)],
            vec![inline("id", ParameterIn::Path)],
        );
        enabled().apply(&mut item);
        assert_eq!(item.get.as_ref().unwrap().parameters.len(), 2);
    }

    #[test]
    fn test_apply_twice_is_idempotent() {
        let mut once = path_with(
            vec![inline("tenant", ParameterIn::Header), inline("limit", ParameterIn::Query)],
            vec![inline("limit", ParameterIn::Query)],
        );
        enabled().apply(&mut once);
        let mut twice = once.clone();
        assert_eq!(enabled().apply(&mut twice), 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_disabled_leaves_path_untouched() {
        let mut item = path_with(vec![inline("tenant", ParameterIn::Header)], vec![]);
        let before = item.clone();
        assert_eq!(ParameterPropagation::disabled().apply(&mut item), 0);
        assert_eq!(item, before);
    }

    #[test]
    fn test_no_operations_is_noop() {
        let mut item = PathItem {
            parameters: Some(vec![inline("tenant", ParameterIn::Header)]),
            ..Default::default()
        };
        assert_eq!(enabled().apply(&mut item), 0);
        assert_eq!(item.parameters.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_empty_shared_list_is_noop() {
        let mut item = path_with(vec![], vec![inline("id", ParameterIn::Path)]);
        assert_eq!(enabled().apply(&mut item), 0);
        assert_eq!(item.parameters, Some(vec![]));
    }

    #[test]
    fn test_unresolved_refs_never_match() {
        let shared = RefOr::Ref(Reference::new("#/components/parameters/Limit"));
        let mut item = path_with(vec![shared.clone()], vec![shared]);
        enabled().apply(&mut item);
        assert_eq!(item.get.as_ref().unwrap().parameters.len(), 2);
    }
}
