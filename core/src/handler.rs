#![deny(missing_docs)]

//! # Handler Abstraction
//!
//! The capability set the operation reader needs from an endpoint: its formal
//! parameters with their attributes, its return type, the error types it
//! declares, and its method-level attributes.
//!
//! Two implementations ship with the crate: [`HandlerSpec`], an in-memory
//! fixture assembled with builder calls, and
//! [`SourceHandler`](crate::parser::SourceHandler), read from Rust source.

/// Documentation attribute on a parameter (`#[api_param(...)]`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiParam {
    /// Explicit documentation name. Overrides every other name source.
    pub name: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Explicit data type for body parameters.
    pub data_type: Option<String>,
}

/// Query or header binding (`#[request_param(...)]`, `#[request_header(...)]`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParam {
    /// Bound name, if declared.
    pub name: Option<String>,
    /// Declared required flag. Unspecified means required.
    pub required: Option<bool>,
    /// Declared default value.
    pub default_value: Option<String>,
}

impl RequestParam {
    /// A binding with an explicit name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Sets the required flag.
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }
}

/// An attribute attached to one formal parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamAnnotation {
    /// Documentation metadata.
    ApiParam(ApiParam),
    /// Bound to a path segment, optionally naming it.
    PathVariable(Option<String>),
    /// Bound to the request body.
    RequestBody,
    /// Bound to a model assembled from the request, optionally naming it.
    ModelAttribute(Option<String>),
    /// Bound to a query parameter.
    RequestParam(RequestParam),
    /// Bound to a request header.
    RequestHeader(RequestParam),
}

impl ParamAnnotation {
    /// The explicit name declared by a framework binding, if any.
    ///
    /// Documentation names are not binding names and return `None`.
    pub fn binding_name(&self) -> Option<&str> {
        let name = match self {
            ParamAnnotation::PathVariable(name) | ParamAnnotation::ModelAttribute(name) => {
                name.as_deref()
            }
            ParamAnnotation::RequestParam(p) | ParamAnnotation::RequestHeader(p) => {
                p.name.as_deref()
            }
            ParamAnnotation::ApiParam(_) | ParamAnnotation::RequestBody => None,
        };
        name.filter(|n| !n.is_empty())
    }

    /// Whether this is a framework binding (anything but documentation metadata).
    pub fn is_binding(&self) -> bool {
        !matches!(self, ParamAnnotation::ApiParam(_))
    }
}

/// An explicit error entry (`#[api_error(code = 404, reason = "...")]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code.
    pub code: u16,
    /// Reason text.
    pub reason: String,
}

impl ApiError {
    /// Creates a new entry.
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }
}

/// Operation-level documentation (`#[api_operation(...)]`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiOperation {
    /// Summary line.
    pub value: Option<String>,
    /// Longer notes.
    pub notes: Option<String>,
    /// Nickname override.
    pub nickname: Option<String>,
    /// Response class override.
    pub response_class: Option<String>,
}

/// An attribute attached to the handler itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodAnnotation {
    /// Operation-level documentation.
    ApiOperation(ApiOperation),
    /// Explicit list of error descriptors.
    ApiErrors(Vec<ApiError>),
    /// Error types the handler is expected to raise.
    ThrowsErrors(Vec<String>),
}

/// One formal parameter of a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormalParameter {
    /// Zero-based position in the signature.
    pub index: usize,
    /// Declared type as written (e.g. `String`, `Vec<Pet>`).
    pub declared_type: String,
    /// Name retained from the signature, when available.
    pub debug_name: Option<String>,
    /// Attributes in declaration order.
    pub annotations: Vec<ParamAnnotation>,
}

impl FormalParameter {
    /// A parameter of the given type with no name and no attributes.
    ///
    /// The index is assigned when the parameter is added to a [`HandlerSpec`].
    pub fn new(declared_type: impl Into<String>) -> Self {
        Self {
            index: 0,
            declared_type: declared_type.into(),
            debug_name: None,
            annotations: Vec::new(),
        }
    }

    /// Sets the retained signature name.
    pub fn debug_name(mut self, name: impl Into<String>) -> Self {
        self.debug_name = Some(name.into());
        self
    }

    /// Appends an attribute.
    pub fn annotate(mut self, annotation: ParamAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// The documentation attribute, if present.
    pub fn api_param(&self) -> Option<&ApiParam> {
        self.annotations.iter().find_map(|a| match a {
            ParamAnnotation::ApiParam(p) => Some(p),
            _ => None,
        })
    }

    /// Whether any framework binding is attached.
    pub fn has_binding(&self) -> bool {
        self.annotations.iter().any(ParamAnnotation::is_binding)
    }
}

/// The capability set an endpoint handler exposes to the operation reader.
pub trait Handler {
    /// Simple name of the handler function.
    fn name(&self) -> &str;

    /// Formal parameters in declaration order.
    fn parameters(&self) -> &[FormalParameter];

    /// Declared return type as written, `None` when nothing is returned.
    fn return_type(&self) -> Option<&str>;

    /// Error types declared by the signature itself.
    fn declared_errors(&self) -> &[String];

    /// Handler-level attributes in declaration order.
    fn annotations(&self) -> &[MethodAnnotation];

    /// Doc comment attached to the handler.
    fn doc(&self) -> Option<&str> {
        None
    }

    /// The operation-level documentation attribute, if present.
    fn api_operation(&self) -> Option<&ApiOperation> {
        self.annotations().iter().find_map(|a| match a {
            MethodAnnotation::ApiOperation(op) => Some(op),
            _ => None,
        })
    }
}

/// An in-memory handler description.
///
/// # Examples
/// ```
/// use opdoc_core::handler::{FormalParameter, Handler, HandlerSpec, ParamAnnotation};
///
/// let handler = HandlerSpec::new("get_pet")
///     .returns("Pet")
///     .param(
///         FormalParameter::new("u64")
///             .debug_name("pet_id")
///             .annotate(ParamAnnotation::PathVariable(None)),
///     )
///     .throws("NotFound");
/// assert_eq!(handler.parameters()[0].index, 0);
/// assert_eq!(handler.declared_errors(), ["NotFound"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerSpec {
    name: String,
    parameters: Vec<FormalParameter>,
    return_type: Option<String>,
    declared_errors: Vec<String>,
    annotations: Vec<MethodAnnotation>,
    doc: Option<String>,
}

impl HandlerSpec {
    /// Creates a handler with the given simple name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends a formal parameter, assigning its index.
    pub fn param(mut self, mut parameter: FormalParameter) -> Self {
        parameter.index = self.parameters.len();
        self.parameters.push(parameter);
        self
    }

    /// Sets the declared return type.
    pub fn returns(mut self, ty: impl Into<String>) -> Self {
        self.return_type = Some(ty.into());
        self
    }

    /// Declares an error type raised by the signature.
    pub fn throws(mut self, error_type: impl Into<String>) -> Self {
        self.declared_errors.push(error_type.into());
        self
    }

    /// Appends a handler-level attribute.
    pub fn annotate(mut self, annotation: MethodAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Sets the doc comment.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

impl Handler for HandlerSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> &[FormalParameter] {
        &self.parameters
    }

    fn return_type(&self) -> Option<&str> {
        self.return_type.as_deref()
    }

    fn declared_errors(&self) -> &[String] {
        &self.declared_errors
    }

    fn annotations(&self) -> &[MethodAnnotation] {
        &self.annotations
    }

    fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_name_ignores_docs_and_empty() {
        let doc = ParamAnnotation::ApiParam(ApiParam {
            name: Some("docName".into()),
            ..ApiParam::default()
        });
        assert_eq!(doc.binding_name(), None);
        assert!(!doc.is_binding());

        let empty = ParamAnnotation::PathVariable(Some(String::new()));
        assert_eq!(empty.binding_name(), None);

        let query = ParamAnnotation::RequestParam(RequestParam::named("q").required(false));
        assert_eq!(query.binding_name(), Some("q"));
    }

    #[test]
    fn test_builder_assigns_indexes_in_order() {
        let handler = HandlerSpec::new("h")
            .param(FormalParameter::new("String"))
            .param(FormalParameter::new("i32"))
            .param(FormalParameter::new("bool"));
        let indexes: Vec<_> = handler.parameters().iter().map(|p| p.index).collect();
        assert_eq!(indexes, [0, 1, 2]);
    }

    #[test]
    fn test_api_operation_lookup() {
        let handler = HandlerSpec::new("h").annotate(MethodAnnotation::ApiOperation(ApiOperation {
            value: Some("Find pets".into()),
            ..ApiOperation::default()
        }));
        assert_eq!(
            handler.api_operation().and_then(|op| op.value.as_deref()),
            Some("Find pets")
        );
        assert!(HandlerSpec::new("bare").api_operation().is_none());
    }
}
