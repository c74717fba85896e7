//! Per-project manifest: `flowsync.config.json`.
//!
//! The manifest lives at the project root and is the source of truth for
//! discovery: which component types exist, which folder each one lives in,
//! and which engine domain the project publishes into. Discovery never
//! scans for unknown folder names — only what the manifest declares.
//!
//! The manifest is an explicit value threaded through calls. There is no
//! process-global cache; callers re-run [`Manifest::load`] when they want a
//! reload.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Manifest filename, expected at the project root.
pub const MANIFEST_FILE: &str = "flowsync.config.json";

/// Flow identifier used when detection fails entirely.
pub const DEFAULT_FLOW: &str = "sys-flows";

/// The component types the engine understands.
///
/// An explicit enumeration rather than a free-form map: every mapping in
/// the manifest must name one of these, and unknown keys are rejected at
/// load time instead of failing lazily on first lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentType {
    Workflows,
    Tasks,
    Schemas,
    Views,
    Functions,
    Extensions,
}

impl ComponentType {
    /// All component types, in reporting order.
    pub const ALL: [ComponentType; 6] = [
        ComponentType::Workflows,
        ComponentType::Tasks,
        ComponentType::Schemas,
        ComponentType::Views,
        ComponentType::Functions,
        ComponentType::Extensions,
    ];

    /// The remote flow identifier for this type.
    pub fn flow_id(self) -> &'static str {
        match self {
            ComponentType::Workflows => "sys-flows",
            ComponentType::Tasks => "sys-tasks",
            ComponentType::Schemas => "sys-schemas",
            ComponentType::Views => "sys-views",
            ComponentType::Functions => "sys-functions",
            ComponentType::Extensions => "sys-extensions",
        }
    }

    /// Human-readable label, matching the conventional folder name.
    pub fn label(self) -> &'static str {
        match self {
            ComponentType::Workflows => "Workflows",
            ComponentType::Tasks => "Tasks",
            ComponentType::Schemas => "Schemas",
            ComponentType::Views => "Views",
            ComponentType::Functions => "Functions",
            ComponentType::Extensions => "Extensions",
        }
    }

    /// Reverse lookup from a flow identifier.
    pub fn from_flow_id(flow: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.flow_id() == flow)
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The `paths` section of the manifest.
///
/// `componentsRoot` is required; each component type is optional and maps
/// to a folder name relative to the components root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestPaths {
    #[serde(rename = "componentsRoot")]
    pub components_root: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflows: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<String>,
}

/// A parsed and validated project manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Target engine domain for every definition in this project.
    pub domain: String,
    /// Component folder layout.
    pub paths: ManifestPaths,
}

impl Manifest {
    /// Load and validate the manifest from `<project_root>/flowsync.config.json`.
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(MANIFEST_FILE);
        if !path.is_file() {
            return Err(ConfigError::ManifestNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadFile {
            path: path.display().to_string(),
            source: e,
        })?;
        let manifest: Manifest =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ManifestParse {
                path: path.display().to_string(),
                source: e,
            })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parse a manifest from a JSON string (validation included).
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: Manifest =
            serde_json::from_str(json).map_err(|e| ConfigError::ManifestParse {
                path: MANIFEST_FILE.to_string(),
                source: e,
            })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Eager validation of required fields.
    fn validate(&self) -> Result<()> {
        if self.domain.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "domain".to_string(),
            });
        }
        if self.paths.components_root.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "paths.componentsRoot".to_string(),
            });
        }
        if self.mappings().is_empty() {
            return Err(ConfigError::NoComponentMappings);
        }
        Ok(())
    }

    /// Absolute path of the components root.
    pub fn components_root(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.paths.components_root)
    }

    /// Folder name configured for a component type, if any.
    pub fn folder_name(&self, ty: ComponentType) -> Option<&str> {
        let name = match ty {
            ComponentType::Workflows => &self.paths.workflows,
            ComponentType::Tasks => &self.paths.tasks,
            ComponentType::Schemas => &self.paths.schemas,
            ComponentType::Views => &self.paths.views,
            ComponentType::Functions => &self.paths.functions,
            ComponentType::Extensions => &self.paths.extensions,
        };
        name.as_deref()
    }

    /// All configured (type, folder name) pairs, in reporting order.
    pub fn mappings(&self) -> Vec<(ComponentType, &str)> {
        ComponentType::ALL
            .iter()
            .filter_map(|&ty| self.folder_name(ty).map(|f| (ty, f)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const FULL: &str = r#"{
        "domain": "core",
        "paths": {
            "componentsRoot": "src/components",
            "workflows": "Workflows",
            "tasks": "Tasks"
        }
    }"#;

    #[test]
    fn load_valid_manifest() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), FULL).unwrap();

        let manifest = Manifest::load(dir.path()).unwrap();
        assert_eq!(manifest.domain, "core");
        assert_eq!(
            manifest.components_root(dir.path()),
            dir.path().join("src/components")
        );
        assert_eq!(
            manifest.mappings(),
            vec![
                (ComponentType::Workflows, "Workflows"),
                (ComponentType::Tasks, "Tasks"),
            ]
        );
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Manifest::load(dir.path()),
            Err(ConfigError::ManifestNotFound { .. })
        ));
    }

    #[test]
    fn missing_components_root_rejected() {
        let err = Manifest::from_json(r#"{"domain": "core", "paths": {"workflows": "W"}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::ManifestParse { .. }));
    }

    #[test]
    fn empty_components_root_rejected() {
        let err = Manifest::from_json(
            r#"{"domain": "core", "paths": {"componentsRoot": "", "workflows": "W"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { .. }));
    }

    #[test]
    fn empty_domain_rejected() {
        let err = Manifest::from_json(
            r#"{"domain": "", "paths": {"componentsRoot": "c", "workflows": "W"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { .. }));
    }

    #[test]
    fn no_component_mappings_rejected() {
        let err = Manifest::from_json(r#"{"domain": "core", "paths": {"componentsRoot": "c"}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::NoComponentMappings));
    }

    #[test]
    fn unknown_path_keys_rejected() {
        // Loose keys failing lazily is exactly what the typed mapping prevents.
        let err = Manifest::from_json(
            r#"{"domain": "d", "paths": {"componentsRoot": "c", "widgets": "W"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ManifestParse { .. }));
    }

    #[test]
    fn flow_ids_round_trip() {
        for ty in ComponentType::ALL {
            assert_eq!(ComponentType::from_flow_id(ty.flow_id()), Some(ty));
        }
        assert_eq!(ComponentType::from_flow_id("sys-nothing"), None);
    }
}
