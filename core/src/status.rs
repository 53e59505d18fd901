#![deny(missing_docs)]

//! # Exception Status Table
//!
//! Static mapping from error type names to HTTP status codes and reasons.
//! Entries are keyed by simple type name, so `crate::errors::NotFound` and
//! `NotFound` share one entry.
//!
//! The table can be assembled programmatically, deserialized from config, or
//! collected from `#[response_status(...)]` attributes on error types:
//!
//! ```ignore
//! #[response_status(code = 404, reason = "Invalid ID supplied")]
//! pub struct NotFound;
//! ```

use crate::error::AppResult;
use crate::operation::ErrorDescriptor;
use crate::parser::attributes::{attr_name, parse_attr_args, AttrValue};
use crate::type_mapping::simple_type_name;
use http::StatusCode;
use indexmap::IndexMap;
use ra_ap_edition::Edition;
use ra_ap_syntax::ast::{self, HasAttrs, HasName};
use ra_ap_syntax::{AstNode, SourceFile};
use serde::{Deserialize, Serialize};

/// One row of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    /// HTTP status code.
    pub code: u16,
    /// Reason text. Defaults to the canonical phrase for the code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl StatusEntry {
    /// The reason text, falling back to the canonical HTTP phrase.
    pub fn reason_text(&self) -> String {
        if let Some(reason) = self.reason.as_deref().filter(|r| !r.is_empty()) {
            return reason.to_string();
        }
        StatusCode::from_u16(self.code)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("Unknown")
            .to_string()
    }
}

/// Maps error type names to `(code, reason)` pairs.
///
/// Deserialized keys are normalized like [`insert`](Self::insert) keys, so a
/// config entry for `errors::NotFound` matches `NotFound`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "IndexMap<String, StatusEntry>",
    into = "IndexMap<String, StatusEntry>"
)]
pub struct ExceptionStatusTable {
    entries: IndexMap<String, StatusEntry>,
}

impl From<IndexMap<String, StatusEntry>> for ExceptionStatusTable {
    fn from(raw: IndexMap<String, StatusEntry>) -> Self {
        let mut table = Self::new();
        for (name, entry) in raw {
            table.insert(&name, entry.code, entry.reason);
        }
        table
    }
}

impl From<ExceptionStatusTable> for IndexMap<String, StatusEntry> {
    fn from(table: ExceptionStatusTable) -> Self {
        table.entries
    }
}

impl ExceptionStatusTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entry.
    pub fn insert(&mut self, type_name: &str, code: u16, reason: Option<String>) {
        self.entries
            .insert(simple_type_name(type_name), StatusEntry { code, reason });
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, type_name: &str, code: u16, reason: &str) -> Self {
        self.insert(type_name, code, Some(reason.to_string()));
        self
    }

    /// Maps an error type to a descriptor. Unmapped types yield `None`.
    pub fn lookup(&self, type_name: &str) -> Option<ErrorDescriptor> {
        self.entries
            .get(&simple_type_name(type_name))
            .map(|entry| ErrorDescriptor::new(entry.code, entry.reason_text()))
    }

    /// Adds entries from `other` that this table does not already define.
    pub fn merge(&mut self, other: &ExceptionStatusTable) {
        for (name, entry) in &other.entries {
            self.entries
                .entry(name.clone())
                .or_insert_with(|| entry.clone());
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collects entries from `#[response_status(...)]` attributes on structs and enums.
    ///
    /// Both `code = 404, reason = "..."` and the positional `404, "..."` forms are read.
    ///
    /// # Examples
    /// ```
    /// use opdoc_core::ExceptionStatusTable;
    ///
    /// let code = r#"
    ///     #[response_status(code = 404, reason = "Invalid ID supplied")]
    ///     pub struct NotFound;
    /// "#;
    /// let table = ExceptionStatusTable::from_source(code).unwrap();
    /// assert_eq!(table.lookup("NotFound").unwrap().code, 404);
    /// ```
    pub fn from_source(code: &str) -> AppResult<Self> {
        let parse = SourceFile::parse(code, Edition::Edition2021);
        let file = parse.tree();
        let mut table = Self::new();

        for node in file.syntax().descendants() {
            let (name, attrs) = if let Some(s) = ast::Struct::cast(node.clone()) {
                (s.name(), s.attrs())
            } else if let Some(e) = ast::Enum::cast(node) {
                (e.name(), e.attrs())
            } else {
                continue;
            };

            let Some(name) = name else { continue };
            for attr in attrs {
                if attr_name(&attr).as_deref() != Some("response_status") {
                    continue;
                }
                let args = parse_attr_args(&attr);
                let code = args
                    .named("code")
                    .or_else(|| args.positional(0))
                    .and_then(AttrValue::as_int);
                let reason = args
                    .named("reason")
                    .or_else(|| args.positional(1))
                    .and_then(AttrValue::as_str)
                    .map(str::to_string);

                if let Some(code) = code.and_then(|c| u16::try_from(c).ok()) {
                    table.insert(name.text().as_str(), code, reason);
                }
            }
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_simple_name() {
        let table = ExceptionStatusTable::new().with("errors::NotFound", 404, "Invalid ID supplied");
        let found = table.lookup("crate::errors::NotFound").unwrap();
        assert_eq!(found, ErrorDescriptor::new(404, "Invalid ID supplied"));
        assert!(table.lookup("Conflict").is_none());
    }

    #[test]
    fn test_reason_defaults_to_canonical_phrase() {
        let mut table = ExceptionStatusTable::new();
        table.insert("Gone", 410, None);
        table.insert("Weird", 599, None);
        assert_eq!(table.lookup("Gone").unwrap().reason, "Gone");
        assert_eq!(table.lookup("Weird").unwrap().reason, "Unknown");
    }

    #[test]
    fn test_merge_keeps_existing_entries() {
        let mut primary = ExceptionStatusTable::new().with("NotFound", 404, "Primary");
        let secondary = ExceptionStatusTable::new()
            .with("NotFound", 410, "Secondary")
            .with("BadRequest", 400, "Bad input");
        primary.merge(&secondary);
        assert_eq!(primary.len(), 2);
        assert_eq!(primary.lookup("NotFound").unwrap().reason, "Primary");
        assert_eq!(primary.lookup("BadRequest").unwrap().code, 400);
    }

    #[test]
    fn test_from_source_reads_struct_and_enum_attributes() {
        let code = r#"
            #[derive(Debug)]
            #[response_status(code = 404, reason = "Invalid ID supplied")]
            pub struct NotFoundError;

            #[response_status(400, "Bad request")]
            pub enum BadRequestError { Missing, Malformed }

            pub struct Plain;
        "#;
        let table = ExceptionStatusTable::from_source(code).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.lookup("NotFoundError").unwrap(),
            ErrorDescriptor::new(404, "Invalid ID supplied")
        );
        assert_eq!(table.lookup("BadRequestError").unwrap().code, 400);
        assert!(table.lookup("Plain").is_none());
    }

    #[test]
    fn test_deserialized_path_keys_match_simple_names() {
        let yaml = "errors::NotFound:\n  code: 404\n  reason: Invalid ID supplied\n";
        let table: ExceptionStatusTable = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(table.lookup("NotFound").unwrap().code, 404);
        assert_eq!(table.lookup("crate::errors::NotFound").unwrap().code, 404);
    }

    #[test]
    fn test_deserializes_from_yaml() {
        let yaml = "NotFound:\n  code: 404\n  reason: Invalid ID supplied\nGone:\n  code: 410\n";
        let table: ExceptionStatusTable = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(table.lookup("NotFound").unwrap().reason, "Invalid ID supplied");
        assert_eq!(table.lookup("Gone").unwrap().reason, "Gone");
    }
}
