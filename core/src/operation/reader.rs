//! # Operation Reader
//!
//! Assembles one [`Operation`] from a handler: nickname, response class,
//! resolved parameters and merged error responses.

use crate::error::{AppError, AppResult};
use crate::handler::Handler;
use crate::operation::classifier::classify_parameter;
use crate::operation::errors::{merge_error_responses, ErrorStrategy, DEFAULT_STRATEGIES};
use crate::operation::models::{
    DocumentationContext, HttpMethod, Operation, ParamType, ParameterDescriptor, RouteCondition,
};
use crate::operation::names::resolve_parameter_name;
use crate::status::ExceptionStatusTable;
use crate::type_mapping::{DataType, RustTypeMapper, TypeMapper};
use std::collections::HashSet;
use tracing::{debug, debug_span, warn};

/// Reader behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Consult parameter names retained from the signature. When off, parameters
    /// without a documentation or binding name get positional names.
    pub debug_parameter_names: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            debug_parameter_names: true,
        }
    }
}

/// Reads operations from handlers.
///
/// Holds only immutable configuration, so one reader can serve any number of
/// handlers from any number of threads.
///
/// # Examples
/// ```
/// use opdoc_core::handler::{FormalParameter, HandlerSpec, ParamAnnotation};
/// use opdoc_core::{DocumentationContext, ExceptionStatusTable, HttpMethod, OperationReader, RouteCondition};
///
/// let reader = OperationReader::new(
///     ExceptionStatusTable::new().with("NotFound", 404, "Pet not found"),
/// );
/// let handler = HandlerSpec::new("get_pet")
///     .returns("Pet")
///     .throws("NotFound")
///     .param(
///         FormalParameter::new("u64")
///             .debug_name("pet_id")
///             .annotate(ParamAnnotation::PathVariable(None)),
///     );
/// let op = reader
///     .read_operation(
///         &DocumentationContext::default(),
///         &handler,
///         &RouteCondition::default(),
///         HttpMethod::Get,
///     )
///     .unwrap();
/// assert_eq!(op.nickname, "get_pet");
/// assert_eq!(op.response_class, "Pet");
/// assert_eq!(op.parameters[0].name, "pet_id");
/// assert_eq!(op.error_responses[0].code, 404);
/// ```
pub struct OperationReader {
    options: ReaderOptions,
    statuses: ExceptionStatusTable,
    strategies: Vec<ErrorStrategy>,
    mapper: Box<dyn TypeMapper + Send + Sync>,
}

impl OperationReader {
    /// Creates a reader with default options over the given status table.
    pub fn new(statuses: ExceptionStatusTable) -> Self {
        Self {
            options: ReaderOptions::default(),
            statuses,
            strategies: DEFAULT_STRATEGIES.to_vec(),
            mapper: Box::new(RustTypeMapper),
        }
    }

    /// Replaces the reader options.
    pub fn with_options(mut self, options: ReaderOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the error strategies. They run in the given order.
    pub fn with_strategies(mut self, strategies: Vec<ErrorStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Replaces the type mapper.
    pub fn with_mapper(mut self, mapper: impl TypeMapper + Send + Sync + 'static) -> Self {
        self.mapper = Box::new(mapper);
        self
    }

    /// The active options.
    pub fn options(&self) -> ReaderOptions {
        self.options
    }

    /// The status table used to map error types.
    pub fn statuses(&self) -> &ExceptionStatusTable {
        &self.statuses
    }

    /// Reads the operation served by `handler` for `http_method`.
    ///
    /// Missing names, unmapped error types and unclassifiable parameters degrade
    /// to defaults. A handler that cannot be read at all fails with
    /// [`AppError::InvalidHandler`].
    pub fn read_operation(
        &self,
        context: &DocumentationContext,
        handler: &dyn Handler,
        route: &RouteCondition,
        http_method: HttpMethod,
    ) -> AppResult<Operation> {
        let handler_name = handler.name().trim();
        if handler_name.is_empty() {
            return Err(AppError::InvalidHandler("Handler has no name".into()));
        }

        let span = debug_span!(
            "read_operation",
            handler = handler_name,
            method = %http_method,
            api_version = %context.api_version
        );
        let _guard = span.enter();

        let api_operation = handler.api_operation();

        let nickname = api_operation
            .and_then(|op| op.nickname.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or(handler_name)
            .to_string();

        let response_class = match api_operation
            .and_then(|op| op.response_class.as_deref())
            .filter(|c| !c.is_empty())
        {
            Some(explicit) => explicit.to_string(),
            None => match handler.return_type() {
                Some(ty) => self.map_type(handler_name, "return type", ty)?.to_string(),
                None => DataType::Void.to_string(),
            },
        };

        let parameters = self.read_parameters(handler_name, handler, route)?;
        let error_responses = merge_error_responses(handler, &self.statuses, &self.strategies);

        let summary = api_operation
            .and_then(|op| op.value.clone())
            .or_else(|| {
                handler
                    .doc()
                    .and_then(|doc| doc.lines().next())
                    .map(|line| line.trim().to_string())
            })
            .filter(|s| !s.is_empty());
        let notes = api_operation.and_then(|op| op.notes.clone());

        debug!(
            parameters = parameters.len(),
            errors = error_responses.len(),
            response_class = %response_class,
            "operation read"
        );

        Ok(Operation {
            http_method,
            nickname,
            summary,
            notes,
            parameters,
            response_class,
            error_responses,
        })
    }

    fn read_parameters(
        &self,
        handler_name: &str,
        handler: &dyn Handler,
        route: &RouteCondition,
    ) -> AppResult<Vec<ParameterDescriptor>> {
        let mut seen = HashSet::new();
        let mut parameters = Vec::with_capacity(handler.parameters().len());

        for param in handler.parameters() {
            let name = resolve_parameter_name(param, self.options.debug_parameter_names);
            let context = format!("parameter '{}'", name);
            let data_type = self.map_type(handler_name, &context, &param.declared_type)?;
            let classification = classify_parameter(param, &name, &data_type, route);

            // A parameter is identified by its name and location together
            if !seen.insert((name.clone(), classification.param_type)) {
                return Err(AppError::InvalidHandler(format!(
                    "{}: more than one {} parameter resolves to '{}'",
                    handler_name, classification.param_type, name
                )));
            }

            if classification.param_type == ParamType::Unknown {
                warn!(
                    handler = handler_name,
                    parameter = %name,
                    index = param.index,
                    "parameter matches no binding rule"
                );
            }

            parameters.push(ParameterDescriptor {
                description: param.api_param().and_then(|p| p.description.clone()),
                default_value: classification.default_value,
                allow_multiple: data_type.is_collection(),
                name,
                data_type: classification.data_type,
                param_type: classification.param_type,
                required: classification.required,
            });
        }

        Ok(parameters)
    }

    fn map_type(&self, handler_name: &str, what: &str, rust_type: &str) -> AppResult<DataType> {
        self.mapper.map(rust_type).map_err(|e| {
            AppError::InvalidHandler(format!(
                "{}: {} has unreadable type `{}` ({})",
                handler_name, what, rust_type, e
            ))
        })
    }
}
