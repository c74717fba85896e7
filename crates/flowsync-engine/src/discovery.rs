//! Manifest-driven component folder discovery.
//!
//! Discovery maps component types to folders on disk using the project
//! manifest, and nothing else: unknown directories are never scanned or
//! touched. The result is built once per run and handed to the selector,
//! the embedder, and flow detection.

use std::path::{Path, PathBuf};

use flowsync_config::{ComponentType, Manifest};

use crate::error::{EngineError, Result};

/// Component type → existing folder, for one run.
#[derive(Debug, Clone)]
pub struct DiscoveredFolders {
    entries: Vec<(ComponentType, PathBuf)>,
}

impl DiscoveredFolders {
    /// Resolve the manifest's folder mappings against the filesystem.
    ///
    /// Only folders that actually exist are included. Read-only: no
    /// directory is created or modified.
    pub fn discover(project_root: &Path, manifest: &Manifest) -> Self {
        let root = manifest.components_root(project_root);
        let entries = manifest
            .mappings()
            .into_iter()
            .filter_map(|(ty, folder)| {
                let path = root.join(folder);
                if path.is_dir() {
                    Some((ty, path))
                } else {
                    tracing::debug!(component = %ty, path = %path.display(), "folder not present");
                    None
                }
            })
            .collect();
        Self { entries }
    }

    /// Error if nothing was discovered — there is nothing to reconcile
    /// against, and a run must abort before any remote call.
    pub fn ensure_any(&self) -> Result<&Self> {
        if self.entries.is_empty() {
            Err(EngineError::NoComponentFolders)
        } else {
            Ok(self)
        }
    }

    /// Folder for a component type, if it was discovered.
    pub fn get(&self, ty: ComponentType) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(t, _)| *t == ty)
            .map(|(_, p)| p.as_path())
    }

    /// Iterate discovered (type, folder) pairs in manifest order.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentType, &Path)> {
        self.entries.iter().map(|(t, p)| (*t, p.as_path()))
    }

    /// The component type whose folder contains `path`, if any.
    pub fn type_for_path(&self, path: &Path) -> Option<ComponentType> {
        self.entries
            .iter()
            .find(|(_, folder)| path.starts_with(folder))
            .map(|(ty, _)| *ty)
    }

    /// Number of discovered folders.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was discovered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn manifest() -> Manifest {
        Manifest::from_json(
            r#"{
                "domain": "core",
                "paths": {
                    "componentsRoot": "components",
                    "workflows": "Workflows",
                    "tasks": "Tasks",
                    "views": "Views"
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn only_existing_folders_are_discovered() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("components/Workflows")).unwrap();
        fs::create_dir_all(dir.path().join("components/Tasks")).unwrap();
        // Views folder deliberately absent; an unrelated folder must be ignored.
        fs::create_dir_all(dir.path().join("components/Unrelated")).unwrap();

        let folders = DiscoveredFolders::discover(dir.path(), &manifest());
        assert_eq!(folders.len(), 2);
        assert!(folders.get(ComponentType::Workflows).is_some());
        assert!(folders.get(ComponentType::Tasks).is_some());
        assert!(folders.get(ComponentType::Views).is_none());
    }

    #[test]
    fn empty_discovery_aborts() {
        let dir = TempDir::new().unwrap();
        let folders = DiscoveredFolders::discover(dir.path(), &manifest());
        assert!(folders.is_empty());
        assert!(matches!(
            folders.ensure_any(),
            Err(EngineError::NoComponentFolders)
        ));
    }

    #[test]
    fn type_for_path_matches_containing_folder() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("components/Workflows/sub")).unwrap();

        let folders = DiscoveredFolders::discover(dir.path(), &manifest());
        let inside = dir.path().join("components/Workflows/sub/flow.json");
        let outside = dir.path().join("elsewhere/flow.json");

        assert_eq!(
            folders.type_for_path(&inside),
            Some(ComponentType::Workflows)
        );
        assert_eq!(folders.type_for_path(&outside), None);
    }
}
