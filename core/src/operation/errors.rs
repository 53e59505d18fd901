//! # Error Response Extraction
//!
//! Collects the error responses a handler may produce. Each declaration
//! mechanism is an [`ErrorStrategy`]; strategies run in precedence order and
//! their results merge so that the first descriptor for a status code wins.

use crate::handler::{Handler, MethodAnnotation};
use crate::operation::models::ErrorDescriptor;
use crate::status::ExceptionStatusTable;
use indexmap::IndexMap;
use tracing::debug;

/// A pure source of error descriptors for one handler.
pub type ErrorStrategy = fn(&dyn Handler, &ExceptionStatusTable) -> Vec<ErrorDescriptor>;

/// Explicit lists, then referenced error types, then the signature's own errors.
pub const DEFAULT_STRATEGIES: [ErrorStrategy; 3] =
    [explicit_errors, referenced_errors, declared_errors];

/// Entries of every explicit error list attribute, as written.
pub fn explicit_errors(handler: &dyn Handler, _table: &ExceptionStatusTable) -> Vec<ErrorDescriptor> {
    handler
        .annotations()
        .iter()
        .filter_map(|a| match a {
            MethodAnnotation::ApiErrors(errors) => Some(errors),
            _ => None,
        })
        .flatten()
        .map(|e| ErrorDescriptor::new(e.code, e.reason.clone()))
        .collect()
}

/// Error types referenced by attributes, mapped through the status table.
pub fn referenced_errors(handler: &dyn Handler, table: &ExceptionStatusTable) -> Vec<ErrorDescriptor> {
    let names = handler
        .annotations()
        .iter()
        .filter_map(|a| match a {
            MethodAnnotation::ThrowsErrors(names) => Some(names),
            _ => None,
        })
        .flatten();
    map_error_types(handler.name(), names, table)
}

/// Error types declared by the signature, mapped through the status table.
pub fn declared_errors(handler: &dyn Handler, table: &ExceptionStatusTable) -> Vec<ErrorDescriptor> {
    map_error_types(handler.name(), handler.declared_errors(), table)
}

fn map_error_types<'a>(
    handler: &str,
    names: impl IntoIterator<Item = &'a String>,
    table: &ExceptionStatusTable,
) -> Vec<ErrorDescriptor> {
    names
        .into_iter()
        .filter_map(|name| {
            let mapped = table.lookup(name);
            if mapped.is_none() {
                debug!(handler, error_type = %name, "error type has no status mapping");
            }
            mapped
        })
        .collect()
}

/// Runs `strategies` in order, keeping the first descriptor seen for each code.
pub fn merge_error_responses(
    handler: &dyn Handler,
    table: &ExceptionStatusTable,
    strategies: &[ErrorStrategy],
) -> Vec<ErrorDescriptor> {
    let mut merged: IndexMap<u16, ErrorDescriptor> = IndexMap::new();
    for strategy in strategies {
        for descriptor in strategy(handler, table) {
            merged.entry(descriptor.code).or_insert(descriptor);
        }
    }
    merged.into_values().collect()
}
