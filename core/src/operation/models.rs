#![deny(missing_docs)]

//! # Operation Models
//!
//! Output records produced by the operation reader, and the routing inputs it
//! consumes. Everything here is built fresh per read and never mutated after.

use crate::error::{AppError, AppResult};
use indexmap::IndexSet;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Where a parameter value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// A templated path segment.
    Path,
    /// A query-string parameter.
    Query,
    /// The request body.
    Body,
    /// A request header.
    Header,
    /// No classification rule matched.
    Unknown,
}

impl ParamType {
    /// The lower-case label used in documentation output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Path => "path",
            ParamType::Query => "query",
            ParamType::Body => "body",
            ParamType::Header => "header",
            ParamType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved operation parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDescriptor {
    /// Public-facing name, unique within the operation.
    pub name: String,
    /// Canonical data type name (e.g. "string", "Pet").
    pub data_type: String,
    /// Location of the parameter.
    pub param_type: ParamType,
    /// Whether the parameter must be supplied.
    pub required: bool,
    /// Description from the documentation attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default value declared on a query or header binding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Whether the parameter accepts multiple values.
    pub allow_multiple: bool,
}

/// An error response a handler may produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    /// HTTP status code.
    pub code: u16,
    /// Human-readable reason.
    pub reason: String,
}

impl ErrorDescriptor {
    /// Creates a new descriptor.
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }
}

/// HTTP methods an operation can be read for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    #[default]
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// HEAD
    Head,
    /// OPTIONS
    Options,
    /// TRACE
    Trace,
}

impl HttpMethod {
    /// The upper-case method token.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            "TRACE" => Ok(HttpMethod::Trace),
            other => Err(AppError::General(format!(
                "Unsupported HTTP method '{}'",
                other
            ))),
        }
    }
}

/// The resolved description of one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// The method this operation was read for.
    pub http_method: HttpMethod,
    /// Operation identifier, the handler's simple name unless overridden.
    pub nickname: String,
    /// Short summary of the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Longer notes on the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterDescriptor>,
    /// Normalized return type name, "void" if none.
    pub response_class: String,
    /// Error responses, unique by code, in precedence order.
    pub error_responses: Vec<ErrorDescriptor>,
}

/// Shared documentation metadata. Passed through, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationContext {
    /// Version of the documented API.
    pub api_version: String,
    /// Version of the documentation format.
    pub swagger_version: String,
    /// Base path of the API.
    pub base_path: String,
    /// Base path the documentation is served from.
    pub documentation_base_path: String,
}

impl DocumentationContext {
    /// Creates a new context.
    pub fn new(
        api_version: impl Into<String>,
        swagger_version: impl Into<String>,
        base_path: impl Into<String>,
        documentation_base_path: impl Into<String>,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            swagger_version: swagger_version.into(),
            base_path: base_path.into(),
            documentation_base_path: documentation_base_path.into(),
        }
    }
}

impl Default for DocumentationContext {
    fn default() -> Self {
        Self::new("1.0", "1.1", "", "/api-docs")
    }
}

/// The set of query-parameter names a route accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteCondition {
    accepted: IndexSet<String>,
}

impl RouteCondition {
    /// Creates a condition accepting the given parameter names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accepted: names
                .into_iter()
                .map(Into::into)
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// Builds a condition from routing expressions such as `status`,
    /// `limit=10`, `mode!=fast` or `!debug`.
    ///
    /// Negated expressions (`!debug`) name parameters that must be absent and
    /// are not accepted. Malformed expressions are skipped.
    pub fn from_expressions<I, S>(expressions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        static EXPR_RE: OnceLock<Regex> = OnceLock::new();
        let expr_re = EXPR_RE.get_or_init(|| {
            Regex::new(r"^\s*(!)?\s*([^=!\s]+)\s*(?:!?=.*)?$").expect("Invalid regex")
        });

        let accepted = expressions
            .into_iter()
            .filter_map(|expr| {
                let caps = expr_re.captures(expr.as_ref())?;
                if caps.get(1).is_some() {
                    return None;
                }
                caps.get(2).map(|m| m.as_str().to_string())
            })
            .collect();

        Self { accepted }
    }

    /// Whether the route accepts a parameter with this name.
    pub fn accepts(&self, name: &str) -> bool {
        self.accepted.contains(name)
    }

    /// The accepted names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.accepted.iter().map(String::as_str)
    }

    /// Whether no names are accepted.
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_condition_expressions() {
        let route = RouteCondition::from_expressions(["status", "limit=10", "!debug", "mode!=x"]);
        assert!(route.accepts("status"));
        assert!(route.accepts("limit"));
        assert!(route.accepts("mode"));
        assert!(!route.accepts("debug"));
        assert_eq!(route.names().collect::<Vec<_>>(), ["status", "limit", "mode"]);
    }

    #[test]
    fn test_route_condition_skips_empty_names() {
        let route = RouteCondition::new(["", "q"]);
        assert!(route.accepts("q"));
        assert_eq!(route.names().count(), 1);
        assert!(RouteCondition::default().is_empty());
    }

    #[test]
    fn test_http_method_parsing() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("Delete".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
        assert!("FETCH".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_param_type_serializes_lowercase() {
        let json = serde_json::to_string(&ParamType::Body).unwrap();
        assert_eq!(json, "\"body\"");
    }
}
