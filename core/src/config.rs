#![deny(missing_docs)]

//! # Configuration
//!
//! File-backed settings for reading operations: the documentation context,
//! reader options and the exception status table.
//!
//! ```yaml
//! api_version: "2.0"
//! base_path: /v2
//! debug_parameter_names: true
//! exceptions:
//!   NotFound: { code: 404, reason: "Pet not found" }
//!   Conflict: { code: 409 }
//! ```

use crate::error::{AppError, AppResult};
use crate::operation::{DocumentationContext, ReaderOptions};
use crate::status::ExceptionStatusTable;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Settings loaded from a YAML or JSON file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpdocConfig {
    /// Version of the documented API.
    pub api_version: String,
    /// Version of the documentation format.
    pub swagger_version: String,
    /// Base path of the API.
    pub base_path: String,
    /// Base path the documentation is served from.
    pub documentation_base_path: String,
    /// Whether names retained from handler signatures are used.
    pub debug_parameter_names: bool,
    /// Error type to status mapping.
    pub exceptions: ExceptionStatusTable,
}

impl Default for OpdocConfig {
    fn default() -> Self {
        let context = DocumentationContext::default();
        Self {
            api_version: context.api_version,
            swagger_version: context.swagger_version,
            base_path: context.base_path,
            documentation_base_path: context.documentation_base_path,
            debug_parameter_names: ReaderOptions::default().debug_parameter_names,
            exceptions: ExceptionStatusTable::default(),
        }
    }
}

impl OpdocConfig {
    /// Loads a config file. `.json` files are read as JSON, everything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        debug!(path = %path.display(), json = is_json, "loading config");

        let config = if is_json {
            decode_json(&content)
        } else {
            decode_yaml(&content)
        };
        config.map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Decodes a YAML document.
    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        decode_yaml(content).map_err(AppError::Config)
    }

    /// Decodes a JSON document.
    pub fn from_json_str(content: &str) -> AppResult<Self> {
        decode_json(content).map_err(AppError::Config)
    }

    /// The documentation context described by this config.
    pub fn documentation_context(&self) -> DocumentationContext {
        DocumentationContext::new(
            self.api_version.clone(),
            self.swagger_version.clone(),
            self.base_path.clone(),
            self.documentation_base_path.clone(),
        )
    }

    /// Reader options described by this config.
    pub fn reader_options(&self) -> ReaderOptions {
        ReaderOptions {
            debug_parameter_names: self.debug_parameter_names,
        }
    }

    /// The configured exception table.
    pub fn exception_table(&self) -> &ExceptionStatusTable {
        &self.exceptions
    }
}

fn decode_yaml(content: &str) -> Result<OpdocConfig, String> {
    // An empty document is a valid, all-default config.
    if content.trim().is_empty() {
        return Ok(OpdocConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| e.to_string())
}

fn decode_json(content: &str) -> Result<OpdocConfig, String> {
    serde_json::from_str(content).map_err(|e| e.to_string())
}
