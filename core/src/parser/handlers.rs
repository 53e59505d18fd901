//! # Handler Extraction
//!
//! Reads annotated handler functions from Rust source.
//!
//! ```ignore
//! /// Find a pet by id.
//! #[get("/pets/{petId}")]
//! #[api_errors((code = 400, reason = "Invalid ID supplied"))]
//! pub async fn get_pet(
//!     #[api_param(name = "petId", description = "ID of pet")] Path(id): Path<u64>,
//!     #[request_param(required = false)] verbose: Option<bool>,
//! ) -> Result<Json<Pet>, NotFound> { .. }
//! ```
//!
//! Framework extractors (`Path<T>`, `Json<T>`, `Form<T>`, `Query<T>`) act as
//! binding attributes when no explicit binding is present. A `Result<T, E>` return
//! declares `E` as a raised error type and documents `T` as the response.

use crate::error::{AppError, AppResult};
use crate::handler::{
    ApiError, ApiOperation, ApiParam, FormalParameter, Handler, MethodAnnotation,
    ParamAnnotation, RequestParam,
};
use crate::operation::{HttpMethod, RouteCondition};
use crate::parser::attributes::{attr_name, parse_attr_args, AttrArgs, AttrValue};
use ra_ap_edition::Edition;
use ra_ap_syntax::ast::{self, HasAttrs, HasGenericArgs, HasName};
use ra_ap_syntax::{AstNode, SourceFile, SyntaxKind, SyntaxNode};
use tracing::{debug, warn};

/// Attribute names that turn a function into a handler.
const ROUTE_ATTRS: &[&str] = &[
    "get", "post", "put", "patch", "delete", "head", "options", "trace", "route",
];

/// Attribute names that mark a function as a handler.
///
/// `#[throws]` is read on handlers but does not mark one by itself.
const DOC_ATTRS: &[&str] = &[
    "api_operation",
    "api_error",
    "api_errors",
    "params",
    "api_param",
    "path_variable",
    "request_body",
    "model_attribute",
    "request_param",
    "request_header",
];

/// A handler read from Rust source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceHandler {
    name: String,
    doc: Option<String>,
    parameters: Vec<FormalParameter>,
    return_type: Option<String>,
    declared_errors: Vec<String>,
    annotations: Vec<MethodAnnotation>,
    http_method: HttpMethod,
    path: Option<String>,
    route_params: Vec<String>,
}

impl SourceHandler {
    /// Reads the function `fn_name` from `code`.
    ///
    /// # Examples
    /// ```
    /// use opdoc_core::handler::Handler;
    /// use opdoc_core::parser::SourceHandler;
    ///
    /// let code = r#"
    ///     #[post("/pets")]
    ///     fn add_pet(#[request_body] pet: Pet) -> Result<Pet, BadRequest> { todo!() }
    /// "#;
    /// let handler = SourceHandler::parse(code, "add_pet").unwrap();
    /// assert_eq!(handler.parameters().len(), 1);
    /// assert_eq!(handler.return_type(), Some("Pet"));
    /// assert_eq!(handler.declared_errors(), ["BadRequest"]);
    /// ```
    pub fn parse(code: &str, fn_name: &str) -> AppResult<Self> {
        let parse = SourceFile::parse(code, Edition::Edition2021);
        let file = parse.tree();

        let fn_def = file
            .syntax()
            .descendants()
            .filter_map(ast::Fn::cast)
            .find(|f| f.name().is_some_and(|n| n.text() == fn_name))
            .ok_or_else(|| {
                AppError::InvalidHandler(format!("Function '{}' not found", fn_name))
            })?;

        Self::from_fn(&fn_def)
    }

    /// Builds a handler from a function node.
    pub fn from_fn(fn_def: &ast::Fn) -> AppResult<Self> {
        let name = fn_def
            .name()
            .map(|n| n.text().to_string())
            .ok_or_else(|| AppError::InvalidHandler("Function without a name".into()))?;

        let mut handler = SourceHandler {
            name,
            doc: extract_doc_comment(fn_def.syntax()),
            parameters: Vec::new(),
            return_type: None,
            declared_errors: Vec::new(),
            annotations: Vec::new(),
            http_method: HttpMethod::Get,
            path: None,
            route_params: Vec::new(),
        };

        if let Some(param_list) = fn_def.param_list() {
            // `self` receivers are not part of `params()`
            for (index, param) in param_list.params().enumerate() {
                let parameter = read_parameter(&handler.name, index, &param)?;
                handler.parameters.push(parameter);
            }
        }

        if let Some(ty) = fn_def.ret_type().and_then(|r| r.ty()) {
            match split_result(&ty) {
                Some((ok, err)) => {
                    handler.return_type = Some(ok);
                    handler.declared_errors.extend(err);
                }
                None => handler.return_type = Some(unwrap_response(&ty)),
            }
        }

        for attr in fn_def.attrs() {
            let Some(attr_name) = attr_name(&attr) else {
                continue;
            };
            let args = parse_attr_args(&attr);
            handler.apply_method_attr(&attr_name, &args)?;
        }

        debug!(
            handler = %handler.name,
            parameters = handler.parameters.len(),
            "read handler from source"
        );
        Ok(handler)
    }

    fn apply_method_attr(&mut self, attr_name: &str, args: &AttrArgs) -> AppResult<()> {
        match attr_name {
            "api_operation" => {
                self.annotations
                    .push(MethodAnnotation::ApiOperation(ApiOperation {
                        value: string_arg(args, &["value", "summary"], Some(0)),
                        notes: string_arg(args, &["notes"], None),
                        nickname: string_arg(args, &["nickname"], None),
                        response_class: args
                            .named("response_class")
                            .and_then(AttrValue::as_path)
                            .map(str::to_string),
                    }));
            }
            "api_error" => {
                let error = read_api_error(args).ok_or_else(|| {
                    AppError::InvalidHandler(format!(
                        "{}: #[api_error] needs a numeric code",
                        self.name
                    ))
                })?;
                self.annotations
                    .push(MethodAnnotation::ApiErrors(vec![error]));
            }
            "api_errors" => self.apply_api_errors(args)?,
            "throws" => {
                self.declared_errors.extend(path_list(args));
            }
            "params" => {
                self.route_params.extend(
                    args.iter()
                        .filter_map(|a| a.value.as_str())
                        .map(str::to_string),
                );
            }
            "route" => {
                self.path = string_arg(args, &["path"], Some(0));
                if let Some(method) = string_arg(args, &["method"], None) {
                    self.http_method = method.parse()?;
                }
            }
            method if ROUTE_ATTRS.contains(&method) => {
                self.http_method = method.parse()?;
                self.path = string_arg(args, &["path"], Some(0));
            }
            _ => {}
        }
        Ok(())
    }

    /// `#[api_errors(...)]` carries explicit entries as groups and error types as paths.
    fn apply_api_errors(&mut self, args: &AttrArgs) -> AppResult<()> {
        let mut explicit = Vec::new();
        let mut thrown = Vec::new();

        for arg in args.iter() {
            match (arg.key.as_deref(), &arg.value) {
                (Some("errors"), AttrValue::List(list)) => {
                    for entry in list.iter() {
                        if let Some(group) = entry.value.as_list() {
                            explicit.push(self.required_api_error(group)?);
                        }
                    }
                }
                (Some("value"), AttrValue::List(list)) => thrown.extend(path_list(list)),
                (None, AttrValue::List(group)) => explicit.push(self.required_api_error(group)?),
                (None, AttrValue::Path(path)) => thrown.push(path.clone()),
                _ => {}
            }
        }

        if !explicit.is_empty() {
            self.annotations.push(MethodAnnotation::ApiErrors(explicit));
        }
        if !thrown.is_empty() {
            self.annotations
                .push(MethodAnnotation::ThrowsErrors(thrown));
        }
        Ok(())
    }

    fn required_api_error(&self, group: &AttrArgs) -> AppResult<ApiError> {
        read_api_error(group).ok_or_else(|| {
            AppError::InvalidHandler(format!(
                "{}: #[api_errors] entries need a numeric code",
                self.name
            ))
        })
    }

    /// The method declared by the route attribute, `GET` when absent.
    pub fn http_method(&self) -> HttpMethod {
        self.http_method
    }

    /// The path declared by the route attribute.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// The route condition declared with `#[params("a", "b=1", "!c")]`.
    pub fn route_condition(&self) -> RouteCondition {
        RouteCondition::from_expressions(&self.route_params)
    }
}

impl Handler for SourceHandler {
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

/// A handler function found by [`extract_handlers`].
#[derive(Debug)]
pub struct ExtractedHandler {
    /// Name of the function.
    pub name: String,
    /// The handler, or the reason it could not be read.
    pub handler: AppResult<SourceHandler>,
}

/// Extracts every handler in `code`: functions carrying a route attribute or
/// any documentation attribute.
///
/// Each function is read on its own, so a malformed handler does not hide the
/// others.
pub fn extract_handlers(code: &str) -> Vec<ExtractedHandler> {
    let parse = SourceFile::parse(code, Edition::Edition2021);
    let file = parse.tree();

    file.syntax()
        .descendants()
        .filter_map(ast::Fn::cast)
        .filter(is_handler)
        .map(|f| {
            let name = f.name().map(|n| n.text().to_string()).unwrap_or_default();
            let handler = SourceHandler::from_fn(&f);
            if let Err(e) = &handler {
                warn!(handler = %name, error = %e, "skipping unreadable handler");
            }
            ExtractedHandler { name, handler }
        })
        .collect()
}

fn is_handler(fn_def: &ast::Fn) -> bool {
    let fn_marked = fn_def.attrs().filter_map(|a| attr_name(&a)).any(|name| {
        ROUTE_ATTRS.contains(&name.as_str()) || DOC_ATTRS.contains(&name.as_str())
    });
    let param_marked = fn_def.param_list().is_some_and(|list| {
        list.params()
            .flat_map(|p| p.attrs().collect::<Vec<_>>())
            .filter_map(|a| attr_name(&a))
            .any(|name| DOC_ATTRS.contains(&name.as_str()))
    });
    fn_marked || param_marked
}

fn read_parameter(handler: &str, index: usize, param: &ast::Param) -> AppResult<FormalParameter> {
    let ty = param.ty().ok_or_else(|| {
        AppError::InvalidHandler(format!(
            "{}: parameter {} has no declared type",
            handler, index
        ))
    })?;

    let mut annotations = Vec::new();
    for attr in param.attrs() {
        let Some(name) = attr_name(&attr) else {
            continue;
        };
        if let Some(annotation) = read_param_attr(&name, &parse_attr_args(&attr)) {
            annotations.push(annotation);
        }
    }

    let (declared_type, extractor) = match split_extractor(&ty) {
        Some((binding, inner)) => (inner, Some(binding)),
        None => (ty.syntax().text().to_string(), None),
    };

    let has_binding = annotations.iter().any(ParamAnnotation::is_binding);
    if let (false, Some(binding)) = (has_binding, extractor) {
        annotations.push(binding);
    }

    Ok(FormalParameter {
        index,
        declared_type,
        debug_name: param.pat().as_ref().and_then(pattern_name),
        annotations,
    })
}

fn read_param_attr(name: &str, args: &AttrArgs) -> Option<ParamAnnotation> {
    match name {
        "api_param" => Some(ParamAnnotation::ApiParam(ApiParam {
            name: string_arg(args, &["name"], None),
            description: string_arg(args, &["value", "description"], Some(0)),
            data_type: args
                .named("data_type")
                .and_then(AttrValue::as_path)
                .map(str::to_string),
        })),
        "path_variable" => Some(ParamAnnotation::PathVariable(string_arg(
            args,
            &["value", "name"],
            Some(0),
        ))),
        "request_body" => Some(ParamAnnotation::RequestBody),
        "model_attribute" => Some(ParamAnnotation::ModelAttribute(string_arg(
            args,
            &["value", "name"],
            Some(0),
        ))),
        "request_param" => Some(ParamAnnotation::RequestParam(read_request_param(args))),
        "request_header" => Some(ParamAnnotation::RequestHeader(read_request_param(args))),
        _ => None,
    }
}

fn read_request_param(args: &AttrArgs) -> RequestParam {
    RequestParam {
        name: string_arg(args, &["value", "name"], Some(0)),
        required: args.named("required").and_then(AttrValue::as_bool),
        default_value: string_arg(args, &["default_value"], None),
    }
}

fn read_api_error(args: &AttrArgs) -> Option<ApiError> {
    let code = args
        .named("code")
        .or_else(|| args.positional(0))
        .and_then(AttrValue::as_int)
        .and_then(|c| u16::try_from(c).ok())?;
    let reason = args
        .named("reason")
        .or_else(|| args.positional(1))
        .and_then(AttrValue::as_str)
        .unwrap_or_default();
    Some(ApiError::new(code, reason))
}

/// A string argument by any of `keys`, else the positional string at `position`.
fn string_arg(args: &AttrArgs, keys: &[&str], position: Option<usize>) -> Option<String> {
    args.named_any(keys)
        .or_else(|| position.and_then(|i| args.positional(i)))
        .and_then(AttrValue::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn path_list(args: &AttrArgs) -> Vec<String> {
    args.iter()
        .filter(|a| a.key.is_none())
        .filter_map(|a| a.value.as_path())
        .map(str::to_string)
        .collect()
}

/// The name a parameter pattern binds: `id`, `mut id`, or `Path(id)`.
/// Wildcards and compound patterns bind no single name.
fn pattern_name(pat: &ast::Pat) -> Option<String> {
    match pat {
        ast::Pat::IdentPat(ident) => ident.name().map(|n| n.text().to_string()),
        ast::Pat::TupleStructPat(tuple) => {
            let mut fields = tuple.fields();
            match (fields.next(), fields.next()) {
                (Some(ast::Pat::IdentPat(ident)), None) => {
                    ident.name().map(|n| n.text().to_string())
                }
                _ => None,
            }
        }
        _ => None,
    }
}

/// Splits a path type into its last segment name and first generic type argument.
fn wrapper_parts(ty: &ast::Type) -> Option<(String, Vec<ast::Type>)> {
    let ast::Type::PathType(path_type) = ty else {
        return None;
    };
    let segment = path_type.path()?.segment()?;
    let name = segment.name_ref()?.text().to_string();
    let args = segment
        .generic_arg_list()
        .map(|list| {
            list.generic_args()
                .filter_map(|arg| match arg {
                    ast::GenericArg::TypeArg(t) => t.ty(),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();
    Some((name, args))
}

/// Maps a framework extractor type to its implied binding and inner type.
fn split_extractor(ty: &ast::Type) -> Option<(ParamAnnotation, String)> {
    let (name, args) = wrapper_parts(ty)?;
    let inner = args.first()?.syntax().text().to_string();
    let binding = match name.as_str() {
        "Path" => ParamAnnotation::PathVariable(None),
        "Json" => ParamAnnotation::RequestBody,
        "Form" => ParamAnnotation::ModelAttribute(None),
        "Query" => ParamAnnotation::RequestParam(RequestParam::default()),
        _ => return None,
    };
    Some((binding, inner))
}

/// Splits `Result<T, E>` into `(T, Some(E))`, unwrapping response wrappers on `T`.
///
/// Aliases with a fixed error type (`actix_web::Result<T>`, `anyhow::Result<T>`)
/// yield `(T, None)`.
fn split_result(ty: &ast::Type) -> Option<(String, Option<String>)> {
    let (name, args) = wrapper_parts(ty)?;
    match (name.as_str(), args.as_slice()) {
        ("Result", [ok]) => Some((unwrap_response(ok), None)),
        ("Result", [ok, err]) => Some((
            unwrap_response(ok),
            Some(err.syntax().text().to_string()),
        )),
        _ => None,
    }
}

/// `Json<Pet>` documents as `Pet`.
fn unwrap_response(ty: &ast::Type) -> String {
    match wrapper_parts(ty) {
        Some((name, args)) if name == "Json" && args.len() == 1 => {
            args[0].syntax().text().to_string()
        }
        _ => ty.syntax().text().to_string(),
    }
}

/// Collects `///` comments attached to a node.
pub(crate) fn extract_doc_comment(node: &SyntaxNode) -> Option<String> {
    let lines: Vec<String> = node
        .children_with_tokens()
        .filter(|child| child.kind() == SyntaxKind::COMMENT)
        .filter_map(|child| {
            let text = child.to_string();
            text.strip_prefix("///")
                .filter(|rest| !rest.starts_with('/'))
                .map(|rest| rest.strip_prefix(' ').unwrap_or(rest).to_string())
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n").trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PETS: &str = r#"
        /// Find pet by ID.
        ///
        /// Returns a single pet.
        #[get("/pets/{petId}")]
        #[params("verbose", "!debug")]
        #[api_errors((code = 400, reason = "Invalid ID supplied"), NotFound)]
        pub async fn get_pet(
            #[api_param(name = "petId", description = "ID of pet")] Path(id): Path<u64>,
            #[request_param(required = false, default_value = "false")] verbose: Option<bool>,
            _: HttpRequest,
        ) -> Result<Json<Pet>, ApiError> {
            todo!()
        }

        #[actix_web::post("/pets")]
        #[throws(Conflict)]
        async fn add_pet(body: web::Json<Pet>, form: Form<Tag>, q: Query<Filter>) {}

        fn helper(x: u32) -> u32 { x }
    "#;

    #[test]
    fn test_extract_handlers_skips_plain_functions() {
        let handlers = extract_handlers(PETS);
        let names: Vec<_> = handlers.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["get_pet", "add_pet"]);
        assert!(handlers.iter().all(|h| h.handler.is_ok()));
    }

    #[test]
    fn test_malformed_handler_does_not_hide_others() {
        let code = r#"
            #[get("/good")]
            fn good() {}

            #[get("/bad")]
            #[api_error(reason = "no code")]
            fn bad() {}
        "#;
        let handlers = extract_handlers(code);
        assert_eq!(handlers.len(), 2);
        assert_eq!(handlers[0].handler.as_ref().unwrap().name(), "good");
        assert_eq!(handlers[1].name, "bad");
        assert!(matches!(
            handlers[1].handler,
            Err(AppError::InvalidHandler(_))
        ));
    }

    #[test]
    fn test_throws_alone_does_not_mark_a_handler() {
        let code = r#"
            #[throws(io::Error)]
            fn load_file(path: &Path) -> String { todo!() }

            #[get("/pets")]
            #[throws(NotFound)]
            fn list_pets() {}
        "#;
        let names: Vec<_> = extract_handlers(code).into_iter().map(|h| h.name).collect();
        assert_eq!(names, ["list_pets"]);
    }

    #[test]
    fn test_single_argument_result_alias() {
        let code = r#"
            #[get("/pets")]
            async fn list_pets() -> actix_web::Result<Json<Vec<Pet>>> { todo!() }
        "#;
        let handler = SourceHandler::parse(code, "list_pets").unwrap();
        assert_eq!(handler.return_type(), Some("Vec<Pet>"));
        assert!(handler.declared_errors().is_empty());
    }

    #[test]
    fn test_route_attributes() {
        let handler = SourceHandler::parse(PETS, "get_pet").unwrap();
        assert_eq!(handler.http_method(), HttpMethod::Get);
        assert_eq!(handler.path(), Some("/pets/{petId}"));
        let route = handler.route_condition();
        assert!(route.accepts("verbose"));
        assert!(!route.accepts("debug"));

        let add = SourceHandler::parse(PETS, "add_pet").unwrap();
        assert_eq!(add.http_method(), HttpMethod::Post);
        assert_eq!(add.path(), Some("/pets"));
    }

    #[test]
    fn test_parameters_and_debug_names() {
        let handler = SourceHandler::parse(PETS, "get_pet").unwrap();
        let params = handler.parameters();
        assert_eq!(params.len(), 3);

        assert_eq!(params[0].debug_name.as_deref(), Some("id"));
        assert_eq!(params[0].declared_type, "u64");
        assert_eq!(
            params[0].annotations,
            vec![
                ParamAnnotation::ApiParam(ApiParam {
                    name: Some("petId".into()),
                    description: Some("ID of pet".into()),
                    data_type: None,
                }),
                ParamAnnotation::PathVariable(None),
            ]
        );

        assert_eq!(params[1].debug_name.as_deref(), Some("verbose"));
        assert_eq!(
            params[1].annotations,
            vec![ParamAnnotation::RequestParam(RequestParam {
                name: None,
                required: Some(false),
                default_value: Some("false".into()),
            })]
        );

        assert_eq!(params[2].debug_name, None);
        assert!(params[2].annotations.is_empty());
    }

    #[test]
    fn test_extractor_bindings() {
        let handler = SourceHandler::parse(PETS, "add_pet").unwrap();
        let params = handler.parameters();
        assert_eq!(params[0].annotations, vec![ParamAnnotation::RequestBody]);
        assert_eq!(params[0].declared_type, "Pet");
        assert_eq!(params[1].annotations, vec![ParamAnnotation::ModelAttribute(None)]);
        assert_eq!(
            params[2].annotations,
            vec![ParamAnnotation::RequestParam(RequestParam::default())]
        );
        assert_eq!(handler.return_type(), None);
        assert_eq!(handler.declared_errors(), ["Conflict"]);
    }

    #[test]
    fn test_result_return_and_error_attributes() {
        let handler = SourceHandler::parse(PETS, "get_pet").unwrap();
        assert_eq!(handler.return_type(), Some("Pet"));
        assert_eq!(handler.declared_errors(), ["ApiError"]);
        assert_eq!(
            handler.annotations(),
            [
                MethodAnnotation::ApiErrors(vec![ApiError::new(400, "Invalid ID supplied")]),
                MethodAnnotation::ThrowsErrors(vec!["NotFound".into()]),
            ]
        );
        assert_eq!(
            handler.doc(),
            Some("Find pet by ID.\n\nReturns a single pet.")
        );
    }

    #[test]
    fn test_missing_function_is_invalid_handler() {
        let err = SourceHandler::parse(PETS, "nope").unwrap_err();
        assert!(matches!(err, AppError::InvalidHandler(_)));
    }

    #[test]
    fn test_api_error_without_code_is_invalid_handler() {
        let code = r#"
            #[api_error(reason = "no code")]
            fn broken() {}
        "#;
        let err = SourceHandler::parse(code, "broken").unwrap_err();
        assert!(matches!(err, AppError::InvalidHandler(_)));
    }
}
