//! Definition metadata extraction.
//!
//! A component definition is an opaque JSON document apart from three
//! scalar fields: `key`, `version`, and `flow`. All three may be absent;
//! missing `key`/`version` make the definition a skip, and a missing
//! `flow` is derived from the file's folder via the discovery mapping.

use std::path::Path;

use serde_json::Value;

use flowsync_config::DEFAULT_FLOW;

use crate::discovery::DiscoveredFolders;
use crate::error::{EngineError, Result};

/// One definition read from disk. Never cached across runs.
#[derive(Debug, Clone)]
pub struct ComponentDefinition {
    /// Logical identifier; required for reconciliation.
    pub key: Option<String>,
    /// Semantic version tag; required alongside `key`.
    pub version: Option<String>,
    /// Component flow identifier, when the document carries one.
    pub flow: Option<String>,
    /// The full document, sent verbatim to the API.
    pub payload: Value,
}

impl ComponentDefinition {
    /// True when the definition carries both fields reconciliation needs.
    pub fn is_publishable(&self) -> bool {
        self.key.is_some() && self.version.is_some()
    }
}

/// Read and parse a definition file.
pub fn read_definition(path: &Path) -> Result<ComponentDefinition> {
    let contents = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
    let payload: Value =
        serde_json::from_str(&contents).map_err(|e| EngineError::json(path, e))?;

    Ok(ComponentDefinition {
        key: string_field(&payload, "key"),
        version: string_field(&payload, "version"),
        flow: string_field(&payload, "flow"),
        payload,
    })
}

/// Resolve the flow for a definition.
///
/// The document's own `flow` wins; otherwise the containing discovered
/// folder's type decides; `sys-flows` is the final default.
pub fn resolve_flow(
    definition: &ComponentDefinition,
    path: &Path,
    folders: &DiscoveredFolders,
) -> String {
    if let Some(flow) = &definition.flow {
        return flow.clone();
    }
    folders
        .type_for_path(path)
        .map(|ty| ty.flow_id().to_string())
        .unwrap_or_else(|| DEFAULT_FLOW.to_string())
}

fn string_field(value: &Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
