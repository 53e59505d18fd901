//! # Parameter Name Resolution
//!
//! Picks the public name of a formal parameter. Sources, highest priority first:
//! the documentation name, a binding's declared name, the name retained from the
//! signature, and finally a positional `arg{index}` fallback.

use crate::handler::FormalParameter;
use tracing::debug;

/// Resolves the display name of `param`.
///
/// `use_debug_names` controls whether names retained from the signature are
/// consulted. When they are unavailable the positional fallback is used.
pub fn resolve_parameter_name(param: &FormalParameter, use_debug_names: bool) -> String {
    if let Some(name) = param
        .api_param()
        .and_then(|p| p.name.as_deref())
        .filter(|n| !n.is_empty())
    {
        return name.to_string();
    }

    if let Some(name) = param.annotations.iter().find_map(|a| a.binding_name()) {
        return name.to_string();
    }

    if use_debug_names {
        if let Some(name) = param.debug_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
    }

    let name = fallback_name(param.index);
    debug!(index = param.index, name = %name, "no parameter name available, using position");
    name
}

/// The synthetic name for a parameter at `index`.
pub fn fallback_name(index: usize) -> String {
    format!("arg{}", index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{ApiParam, ParamAnnotation, RequestParam};

    fn documented(name: &str) -> ParamAnnotation {
        ParamAnnotation::ApiParam(ApiParam {
            name: Some(name.into()),
            ..ApiParam::default()
        })
    }

    #[test]
    fn test_documentation_name_wins() {
        let param = FormalParameter::new("String")
            .debug_name("variable_a")
            .annotate(documented("documentationNameA"))
            .annotate(ParamAnnotation::PathVariable(Some("mvcNameA".into())));
        assert_eq!(resolve_parameter_name(&param, true), "documentationNameA");
    }

    #[test]
    fn test_binding_name_beats_debug_name() {
        let param = FormalParameter::new("String")
            .debug_name("variable_b")
            .annotate(ParamAnnotation::PathVariable(Some("mvcNameB".into())));
        assert_eq!(resolve_parameter_name(&param, true), "mvcNameB");

        let query = FormalParameter::new("String")
            .debug_name("variable_e")
            .annotate(ParamAnnotation::RequestParam(RequestParam::named("requestParam1")));
        assert_eq!(resolve_parameter_name(&query, true), "requestParam1");
    }

    #[test]
    fn test_debug_name_used_when_present() {
        let param = FormalParameter::new("String").debug_name("variable_d");
        assert_eq!(resolve_parameter_name(&param, true), "variable_d");
    }

    #[test]
    fn test_fallback_when_debug_names_absent() {
        let mut param = FormalParameter::new("String");
        param.index = 3;
        assert_eq!(resolve_parameter_name(&param, true), "arg3");

        let stripped = param.clone().debug_name("variable_d");
        assert_eq!(resolve_parameter_name(&stripped, false), "arg3");
    }

    #[test]
    fn test_empty_names_count_as_absent() {
        let mut param = FormalParameter::new("String")
            .debug_name("")
            .annotate(documented(""))
            .annotate(ParamAnnotation::ModelAttribute(Some(String::new())));
        param.index = 1;
        assert_eq!(resolve_parameter_name(&param, true), "arg1");
    }
}
