#![deny(missing_docs)]

//! # Parameter and Operation Processors
//!
//! Collaborators the path driver hands work to once a path item is spliced:
//! - **ParameterProcessor**: normalizes a parameter list (resolves `$ref`
//!   entries, applies location defaults).
//! - **OperationProcessor**: resolves an operation in place (parameters,
//!   request body, responses, callbacks).
//!
//! Both receive the session loader explicitly so they share its cache with the
//! driver.

use crate::config::ResolverSettings;
use crate::error::AppResult;
use crate::oas::cache::{Fragment, FragmentKind, RefLoader};
use crate::oas::models::{Callback, Operation, Parameter, ParameterIn, PathItem, RefOr};
use crate::oas::paths::{load_relocated, splice_path_entry};
use tracing::debug;

/// Normalizes a list of parameters.
pub trait ParameterProcessor {
    /// Returns the normalized list. Order is preserved.
    fn process_parameters(
        &self,
        loader: &mut dyn RefLoader,
        parameters: Vec<RefOr<Parameter>>,
    ) -> AppResult<Vec<RefOr<Parameter>>>;
}

/// Resolves a single operation in place.
pub trait OperationProcessor {
    /// Mutates `operation` so that the references it owns are resolved.
    fn process_operation(&self, loader: &mut dyn RefLoader, operation: &mut Operation) -> AppResult<()>;
}

/// Inlines `$ref` parameters and marks path parameters as required.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultParameterProcessor;

impl ParameterProcessor for DefaultParameterProcessor {
    fn process_parameters(
        &self,
        loader: &mut dyn RefLoader,
        parameters: Vec<RefOr<Parameter>>,
    ) -> AppResult<Vec<RefOr<Parameter>>> {
        parameters
            .into_iter()
            .map(|entry| -> AppResult<RefOr<Parameter>> {
                let mut param = match entry {
                    RefOr::T(param) => param,
                    RefOr::Ref(reference) => load_relocated(
                        loader,
                        &reference.ref_location,
                        FragmentKind::Parameter,
                        Fragment::into_parameter,
                    )?,
                };
                // Path parameters are always mandatory.
                if param.location == ParameterIn::Path && param.required.is_none() {
                    param.required = Some(true);
                }
                Ok(RefOr::T(param))
            })
            .collect()
    }
}

/// Resolves parameters, bodies, responses and callbacks of an operation.
pub struct DefaultOperationProcessor {
    settings: ResolverSettings,
    parameter_processor: Box<dyn ParameterProcessor>,
}

impl DefaultOperationProcessor {
    /// Creates a processor using [`DefaultParameterProcessor`].
    pub fn new(settings: &ResolverSettings) -> Self {
        Self {
            settings: settings.clone(),
            parameter_processor: Box::new(DefaultParameterProcessor),
        }
    }

    /// Replaces the parameter processor used for operation parameters.
    pub fn with_parameter_processor(mut self, processor: impl ParameterProcessor + 'static) -> Self {
        self.parameter_processor = Box::new(processor);
        self
    }

    fn process(
        &self,
        loader: &mut dyn RefLoader,
        operation: &mut Operation,
        active: &mut Vec<(FragmentKind, String)>,
    ) -> AppResult<()> {
        let parameters = std::mem::take(&mut operation.parameters);
        operation.parameters = self.parameter_processor.process_parameters(loader, parameters)?;

        if self.settings.resolve_request_bodies {
            if let Some(RefOr::Ref(reference)) = &operation.request_body {
                let body = load_relocated(
                    loader,
                    &reference.ref_location,
                    FragmentKind::RequestBody,
                    Fragment::into_request_body,
                )?;
                operation.request_body = Some(RefOr::T(body));
            }
        }

        if self.settings.resolve_responses {
            for response in operation.responses.iter_mut().flat_map(|r| r.values_mut()) {
                if let RefOr::Ref(reference) = response {
                    let loaded = load_relocated(
                        loader,
                        &reference.ref_location,
                        FragmentKind::Response,
                        Fragment::into_response,
                    )?;
                    *response = RefOr::T(loaded);
                }
            }
        }

        if self.settings.resolve_callbacks {
            if let Some(callbacks) = operation.callbacks.as_mut() {
                for (name, callback) in callbacks.iter_mut() {
                    self.process_callback(loader, name, callback, active)?;
                }
            }
        }
        Ok(())
    }

    fn process_callback(
        &self,
        loader: &mut dyn RefLoader,
        name: &str,
        callback: &mut RefOr<Callback>,
        active: &mut Vec<(FragmentKind, String)>,
    ) -> AppResult<()> {
        let mut pushed = false;
        if let RefOr::Ref(reference) = callback {
            let key = (FragmentKind::Callback, reference.ref_location.clone());
            if active.contains(&key) {
                debug!(name, reference = %key.1, "callback refers back to itself, leaving reference");
                return Ok(());
            }
            let loaded = load_relocated(loader, &key.1, FragmentKind::Callback, Fragment::into_callback)?;
            *callback = RefOr::T(loaded);
            active.push(key);
            pushed = true;
        }

        let result = match callback {
            RefOr::T(expressions) => self.process_expressions(loader, expressions, active),
            RefOr::Ref(_) => Ok(()),
        };
        if pushed {
            active.pop();
        }
        result
    }

    fn process_expressions(
        &self,
        loader: &mut dyn RefLoader,
        expressions: &mut Callback,
        active: &mut Vec<(FragmentKind, String)>,
    ) -> AppResult<()> {
        for (expression, entry) in expressions.iter_mut() {
            let key = entry
                .ref_location()
                .map(|reference| (FragmentKind::PathItem, reference.to_string()));
            if let Some(key) = &key {
                if active.contains(key) {
                    debug!(%expression, reference = %key.1, "path item refers back to itself, leaving reference");
                    continue;
                }
            }
            let item = splice_path_entry(loader, entry)?;
            let pushed = match key {
                Some(key) => {
                    active.push(key);
                    true
                }
                None => false,
            };
            let result = self.process_path_item(loader, item, active);
            if pushed {
                active.pop();
            }
            result?;
        }
        Ok(())
    }

    fn process_path_item(
        &self,
        loader: &mut dyn RefLoader,
        item: &mut PathItem,
        active: &mut Vec<(FragmentKind, String)>,
    ) -> AppResult<()> {
        if let Some(parameters) = item.parameters.clone() {
            item.parameters = Some(self.parameter_processor.process_parameters(loader, parameters)?);
        }
        for (_, op) in item.operations_mut() {
            self.process(loader, op, active)?;
        }
        Ok(())
    }
}

impl OperationProcessor for DefaultOperationProcessor {
    fn process_operation(&self, loader: &mut dyn RefLoader, operation: &mut Operation) -> AppResult<()> {
        self.process(loader, operation, &mut Vec::new())
    }
}
