//! # Parameter Classification
//!
//! Decides where a parameter is read from, its documented data type and whether
//! it is required. Rules are checked in order and the first match wins:
//!
//! 1. path binding → `path`, always required
//! 2. body binding → `body`, required, documentation type override honoured
//! 3. model binding → `body`, required
//! 4. query binding → `query`, declared flag (default required)
//! 5. header binding → `header`, declared flag (default required)
//! 6. name accepted by the route condition → `query`, required
//! 7. otherwise `unknown`

use crate::handler::{FormalParameter, ParamAnnotation, RequestParam};
use crate::operation::models::{ParamType, RouteCondition};
use crate::type_mapping::DataType;

/// The outcome of classifying one parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Where the value is read from.
    pub param_type: ParamType,
    /// Documented data type name.
    pub data_type: String,
    /// Whether the value must be supplied.
    pub required: bool,
    /// Default value declared by a query or header binding.
    pub default_value: Option<String>,
}

impl Classification {
    fn new(param_type: ParamType, data_type: &DataType, required: bool) -> Self {
        Self {
            param_type,
            data_type: data_type.to_string(),
            required,
            default_value: None,
        }
    }

    fn from_binding(param_type: ParamType, data_type: &DataType, binding: &RequestParam) -> Self {
        Self {
            param_type,
            data_type: data_type.to_string(),
            required: binding.required.unwrap_or(true),
            default_value: binding.default_value.clone(),
        }
    }
}

/// Classifies `param`, whose resolved name is `name` and normalized type `data_type`.
pub fn classify_parameter(
    param: &FormalParameter,
    name: &str,
    data_type: &DataType,
    route: &RouteCondition,
) -> Classification {
    let annotations = &param.annotations;

    if annotations
        .iter()
        .any(|a| matches!(a, ParamAnnotation::PathVariable(_)))
    {
        return Classification::new(ParamType::Path, data_type, true);
    }

    if annotations
        .iter()
        .any(|a| matches!(a, ParamAnnotation::RequestBody))
    {
        let mut classification = Classification::new(ParamType::Body, data_type, true);
        if let Some(explicit) = param
            .api_param()
            .and_then(|p| p.data_type.as_deref())
            .filter(|t| !t.is_empty())
        {
            classification.data_type = explicit.to_string();
        }
        return classification;
    }

    if annotations
        .iter()
        .any(|a| matches!(a, ParamAnnotation::ModelAttribute(_)))
    {
        return Classification::new(ParamType::Body, data_type, true);
    }

    if let Some(binding) = annotations.iter().find_map(|a| match a {
        ParamAnnotation::RequestParam(p) => Some(p),
        _ => None,
    }) {
        return Classification::from_binding(ParamType::Query, data_type, binding);
    }

    if let Some(binding) = annotations.iter().find_map(|a| match a {
        ParamAnnotation::RequestHeader(p) => Some(p),
        _ => None,
    }) {
        return Classification::from_binding(ParamType::Header, data_type, binding);
    }

    if route.accepts(name) {
        return Classification::new(ParamType::Query, data_type, true);
    }

    Classification::new(ParamType::Unknown, data_type, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::ApiParam;

    fn classify(param: &FormalParameter, name: &str, route: &RouteCondition) -> Classification {
        classify_parameter(param, name, &DataType::String, route)
    }

    #[test]
    fn test_path_binding_is_required() {
        let param = FormalParameter::new("String").annotate(ParamAnnotation::PathVariable(None));
        let c = classify(&param, "id", &RouteCondition::default());
        assert_eq!(c.param_type, ParamType::Path);
        assert!(c.required);
        assert_eq!(c.data_type, "string");
    }

    #[test]
    fn test_path_beats_other_bindings() {
        let param = FormalParameter::new("String")
            .annotate(ParamAnnotation::RequestParam(RequestParam::default().required(false)))
            .annotate(ParamAnnotation::PathVariable(None));
        let c = classify(&param, "id", &RouteCondition::default());
        assert_eq!(c.param_type, ParamType::Path);
        assert!(c.required);
    }

    #[test]
    fn test_body_binding_with_type_override() {
        let param = FormalParameter::new("Pet")
            .annotate(ParamAnnotation::ApiParam(ApiParam {
                data_type: Some("PetDocument".into()),
                ..ApiParam::default()
            }))
            .annotate(ParamAnnotation::RequestBody);
        let c = classify_parameter(
            &param,
            "pet",
            &DataType::Model("Pet".into()),
            &RouteCondition::default(),
        );
        assert_eq!(c.param_type, ParamType::Body);
        assert!(c.required);
        assert_eq!(c.data_type, "PetDocument");
    }

    #[test]
    fn test_model_attribute_is_body() {
        let param =
            FormalParameter::new("String").annotate(ParamAnnotation::ModelAttribute(Some("c".into())));
        let c = classify(&param, "c", &RouteCondition::default());
        assert_eq!(c.param_type, ParamType::Body);
        assert!(c.required);
    }

    #[test]
    fn test_query_binding_required_flag() {
        let optional = FormalParameter::new("String").annotate(ParamAnnotation::RequestParam(
            RequestParam {
                name: Some("q".into()),
                required: Some(false),
                default_value: Some("all".into()),
            },
        ));
        let c = classify(&optional, "q", &RouteCondition::default());
        assert_eq!(c.param_type, ParamType::Query);
        assert!(!c.required);
        assert_eq!(c.default_value.as_deref(), Some("all"));

        let unspecified = FormalParameter::new("String")
            .annotate(ParamAnnotation::RequestParam(RequestParam::default()));
        assert!(classify(&unspecified, "q", &RouteCondition::default()).required);
    }

    #[test]
    fn test_header_binding() {
        let param = FormalParameter::new("String")
            .annotate(ParamAnnotation::RequestHeader(RequestParam::named("X-Token").required(false)));
        let c = classify(&param, "X-Token", &RouteCondition::default());
        assert_eq!(c.param_type, ParamType::Header);
        assert!(!c.required);
    }

    #[test]
    fn test_route_condition_implies_query() {
        let param = FormalParameter::new("String").debug_name("status");
        let route = RouteCondition::new(["status"]);
        let c = classify(&param, "status", &route);
        assert_eq!(c.param_type, ParamType::Query);
        assert!(c.required);
    }

    #[test]
    fn test_unmatched_is_unknown() {
        let param = FormalParameter::new("String");
        let c = classify(&param, "variable_d", &RouteCondition::new(["other"]));
        assert_eq!(c.param_type, ParamType::Unknown);
        assert!(!c.required);
    }
}
