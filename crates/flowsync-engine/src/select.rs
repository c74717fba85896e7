//! Change-set selection.
//!
//! Three mutually exclusive modes decide which files a run processes: an
//! explicit path, the git working-tree diff, or an exhaustive walk of the
//! discovered folders. Precedence (enforced by the CLI): explicit file
//! over exhaustive over git diff.

use std::path::{Path, PathBuf};
use std::process::Command;

use walkdir::WalkDir;

use crate::discovery::DiscoveredFolders;
use crate::error::Result;

/// Definition file extension.
pub const DEFINITION_EXT: &str = "json";

/// Script file extension.
pub const SCRIPT_EXT: &str = "csx";

/// Directory names never searched for components.
const IGNORED_DIRS: [&str; 3] = ["node_modules", "dist", ".git"];

/// How a run picks its input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A single file, absolute or project-relative.
    Explicit(PathBuf),
    /// Files changed in the git working tree (the default).
    GitDiff,
    /// Every matching file under every discovered folder.
    All,
}

/// Select the definition files to reconcile.
pub fn select_definitions(
    mode: &Selection,
    project_root: &Path,
    folders: &DiscoveredFolders,
) -> Result<Vec<PathBuf>> {
    match mode {
        Selection::Explicit(path) => Ok(vec![resolve_explicit(path, project_root)]),
        Selection::GitDiff => Ok(git_changed_files(project_root, DEFINITION_EXT)
            .into_iter()
            .filter(|p| is_definition_candidate(p))
            .collect()),
        Selection::All => {
            let mut files = Vec::new();
            for (_, folder) in folders.iter() {
                collect_files(folder, DEFINITION_EXT, &mut files, is_definition_candidate);
            }
            Ok(files)
        }
    }
}

/// Select the script files to embed.
///
/// Exhaustive mode walks the whole project for scripts under a `src`
/// segment, since scripts live beside their source tree rather than in
/// component folders.
pub fn select_scripts(mode: &Selection, project_root: &Path) -> Result<Vec<PathBuf>> {
    match mode {
        Selection::Explicit(path) => Ok(vec![resolve_explicit(path, project_root)]),
        Selection::GitDiff => Ok(git_changed_files(project_root, SCRIPT_EXT)),
        Selection::All => {
            let mut files = Vec::new();
            collect_files(project_root, SCRIPT_EXT, &mut files, |p: &Path| {
                p.components()
                    .any(|c| c.as_os_str().to_str() == Some("src"))
            });
            Ok(files)
        }
    }
}

/// Whether a JSON file may be a component definition.
///
/// Metadata folders, diagram annotations, package manifests, and anything
/// with "config" in its name are never definitions.
pub fn is_definition_candidate(path: &Path) -> bool {
    if path.extension().and_then(|e| e.to_str()) != Some(DEFINITION_EXT) {
        return false;
    }
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.ends_with(".diagram.json") || name.contains("package") || name.contains("config") {
        return false;
    }
    !path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .is_some_and(|s| IGNORED_DIRS.contains(&s))
    })
}

fn resolve_explicit(path: &Path, project_root: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

fn collect_files(
    root: &Path,
    ext: &str,
    out: &mut Vec<PathBuf>,
    keep: impl Fn(&Path) -> bool,
) {
    let walker = WalkDir::new(root).into_iter().filter_entry(|e| {
        e.file_name()
            .to_str()
            .is_none_or(|name| !IGNORED_DIRS.contains(&name))
    });
    for entry in walker.flatten() {
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().and_then(|e| e.to_str()) == Some(ext)
            && keep(path)
        {
            out.push(path.to_path_buf());
        }
    }
    out.sort();
}

// ─────────────────────────────────────────────────────────────────────────────
// Git working-tree diff
// ─────────────────────────────────────────────────────────────────────────────

/// Files with the given extension changed in the git working tree.
///
/// Any git failure (no repository, no binary, malformed output) yields an
/// empty list: the caller treats it as "nothing changed".
pub fn git_changed_files(project_root: &Path, ext: &str) -> Vec<PathBuf> {
    let Some(git_root) = git_toplevel(project_root) else {
        return Vec::new();
    };
    let Ok(output) = Command::new("git")
        .args(["status", "--porcelain"])
        .current_dir(&git_root)
        .output()
    else {
        return Vec::new();
    };
    if !output.status.success() {
        return Vec::new();
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_porcelain(&stdout, &git_root, project_root, ext)
}

/// Resolve the repository root for a directory, or `None`.
fn git_toplevel(dir: &Path) -> Option<PathBuf> {
    let output = Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .current_dir(dir)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if root.is_empty() {
        None
    } else {
        Some(PathBuf::from(root))
    }
}

/// Parse `git status --porcelain` output into qualifying absolute paths.
///
/// Each line is a two-character status, a space, then the path relative to
/// the repository root. Kept entries must carry the wanted extension,
/// still exist on disk, and lie within the project root.
fn parse_porcelain(stdout: &str, git_root: &Path, project_root: &Path, ext: &str) -> Vec<PathBuf> {
    stdout
        .lines()
        .filter_map(|line| porcelain_path(line))
        .map(|rel| git_root.join(rel))
        .filter(|path| {
            path.extension().and_then(|e| e.to_str()) == Some(ext)
                && path.is_file()
                && path.starts_with(project_root)
        })
        .collect()
}

/// The path portion of one porcelain status line.
fn porcelain_path(line: &str) -> Option<&str> {
    if line.len() <= 3 {
        return None;
    }
    let path = line[3..].trim();
    if path.is_empty() { None } else { Some(path) }
}
