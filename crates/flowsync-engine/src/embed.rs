//! Script embedding.
//!
//! Definitions reference companion scripts through embedding sites: object
//! nodes carrying a `location` (canonical script path) and a `code` field.
//! Embedding reads a script once and rewrites every matching site in every
//! referencing definition, encoding per site (`NAT` for literal text,
//! Base64 otherwise).
//!
//! A script with no referencing definition is a normal "nothing to do"
//! outcome, not a failure.

use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;

use crate::discovery::DiscoveredFolders;
use crate::error::{EngineError, Result};
use crate::select::is_definition_candidate;

/// Encoding tag value selecting literal text.
const ENCODING_NATIVE: &str = "NAT";

/// Marker segment that starts a canonical script location.
const SOURCE_ROOT: &str = "src";

/// Result of embedding one script.
#[derive(Debug, Clone)]
pub struct EmbedReport {
    /// The script that was embedded.
    pub script: PathBuf,
    /// True when at least one definition was updated.
    pub success: bool,
    /// Number of definition files written.
    pub updated_files: usize,
    /// Total embedding sites updated across all files.
    pub total_updates: usize,
    /// Per-file site counts, in processing order.
    pub per_file: Vec<(PathBuf, usize)>,
}

/// Canonical `location` string for a script path.
///
/// The path is truncated to the segment starting at the last `src`
/// component and joined with forward slashes; without a `src` marker the
/// bare filename is used.
pub fn script_location(script_path: &Path) -> String {
    let parts: Vec<&str> = script_path
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect();

    match parts.iter().rposition(|p| *p == SOURCE_ROOT) {
        Some(idx) => format!("./{}", parts[idx..].join("/")),
        None => format!(
            "./{}",
            script_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
        ),
    }
}

/// Embed one script into every referencing definition under the
/// discovered folders.
pub fn embed(script_path: &Path, folders: &DiscoveredFolders) -> Result<EmbedReport> {
    let native = std::fs::read_to_string(script_path)
        .map_err(|e| EngineError::io(script_path, e))?;
    let encoded = BASE64.encode(native.as_bytes());
    let location = script_location(script_path);

    let candidates = referencing_definitions(script_path, folders);

    let mut per_file = Vec::new();
    let mut total_updates = 0;
    for candidate in candidates {
        // One unreadable or malformed candidate must not abort the
        // script's remaining updates.
        match update_definition(&candidate, &location, &native, &encoded) {
            Ok(count) if count > 0 => {
                total_updates += count;
                per_file.push((candidate, count));
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(
                    file = %candidate.display(),
                    error = %e,
                    "skipping candidate definition"
                );
            }
        }
    }

    let updated_files = per_file.len();
    tracing::debug!(
        script = %script_path.display(),
        updated_files,
        total_updates,
        "embedding finished"
    );

    Ok(EmbedReport {
        script: script_path.to_path_buf(),
        success: updated_files > 0,
        updated_files,
        total_updates,
        per_file,
    })
}

/// Definition files whose raw text mentions the script's filename.
///
/// A cheap textual pre-filter ahead of the structural update; only the
/// discovered folders are searched, never the whole project. Unreadable
/// files are skipped.
fn referencing_definitions(script_path: &Path, folders: &DiscoveredFolders) -> Vec<PathBuf> {
    let Some(basename) = script_path.file_name().and_then(|n| n.to_str()) else {
        return Vec::new();
    };

    let mut matches = Vec::new();
    for (_, folder) in folders.iter() {
        for entry in walkdir::WalkDir::new(folder).into_iter().flatten() {
            let path = entry.path();
            if !entry.file_type().is_file() || !is_definition_candidate(path) {
                continue;
            }
            match std::fs::read_to_string(path) {
                Ok(text) if text.contains(basename) => matches.push(path.to_path_buf()),
                _ => {}
            }
        }
    }
    matches.sort();
    matches
}

/// Update every matching embedding site in one definition file.
///
/// The file is rewritten (pretty, 2-space) only when at least one site was
/// updated. Returns the number of sites updated.
fn update_definition(
    json_path: &Path,
    location: &str,
    native: &str,
    encoded: &str,
) -> Result<usize> {
    let contents = std::fs::read_to_string(json_path).map_err(|e| EngineError::io(json_path, e))?;
    let mut doc: Value =
        serde_json::from_str(&contents).map_err(|e| EngineError::json(json_path, e))?;

    let count = visit_sites(&mut doc, location, native, encoded);
    if count > 0 {
        let pretty = serde_json::to_string_pretty(&doc).map_err(|e| EngineError::json(json_path, e))?;
        std::fs::write(json_path, pretty).map_err(|e| EngineError::io(json_path, e))?;
    }
    Ok(count)
}

/// Recursively update matching sites, returning how many were rewritten.
///
/// A site is an object with a `location` equal to the computed location
/// and a `code` field. JSON documents are acyclic, so plain recursion is
/// safe; the visit returns a count instead of mutating during iteration
/// over siblings.
fn visit_sites(node: &mut Value, location: &str, native: &str, encoded: &str) -> usize {
    let mut count = 0;

    if let Value::Object(map) = node {
        let is_site = map.get("location").and_then(Value::as_str) == Some(location)
            && map.contains_key("code");
        if is_site {
            let body = match map.get("encoding").and_then(Value::as_str) {
                Some(ENCODING_NATIVE) => native,
                _ => encoded,
            };
            map.insert("code".to_string(), Value::String(body.to_string()));
            count += 1;
        }
    }

    match node {
        Value::Object(map) => {
            for (_, child) in map.iter_mut() {
                count += visit_sites(child, location, native, encoded);
            }
        }
        Value::Array(items) => {
            for child in items.iter_mut() {
                count += visit_sites(child, location, native, encoded);
            }
        }
        _ => {}
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowsync_config::Manifest;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn folders(dir: &TempDir) -> DiscoveredFolders {
        fs::create_dir_all(dir.path().join("c/Tasks")).unwrap();
        let manifest = Manifest::from_json(
            r#"{"domain": "d", "paths": {"componentsRoot": "c", "tasks": "Tasks"}}"#,
        )
        .unwrap();
        DiscoveredFolders::discover(dir.path(), &manifest)
    }

    #[test]
    fn location_starts_at_last_src_segment() {
        assert_eq!(
            script_location(Path::new("/home/me/proj/src/Rules/MyRule.csx")),
            "./src/Rules/MyRule.csx"
        );
        assert_eq!(
            script_location(Path::new("/a/src/b/src/Rule.csx")),
            "./src/Rule.csx"
        );
        assert_eq!(script_location(Path::new("/a/b/Loose.csx")), "./Loose.csx");
    }

    #[test]
    fn updates_every_matching_site_across_files() {
        let dir = TempDir::new().unwrap();
        let folders = folders(&dir);

        let script = dir.path().join("src/Rules/MyRule.csx");
        fs::create_dir_all(script.parent().unwrap()).unwrap();
        fs::write(&script, "return true;").unwrap();

        // Fan-in: two sites for the same script in one document, one with a
        // different location that must stay untouched.
        let doc_a = json!({
            "key": "a",
            "steps": [
                {"location": "./src/Rules/MyRule.csx", "code": "stale"},
                {"location": "./src/Rules/Other.csx", "code": "other"},
            ],
            "fallback": {"location": "./src/Rules/MyRule.csx", "code": "stale"}
        });
        // Fan-out: a second referencing document.
        let doc_b = json!({
            "key": "b",
            "handler": {"location": "./src/Rules/MyRule.csx", "code": ""}
        });
        fs::write(
            dir.path().join("c/Tasks/a.json"),
            serde_json::to_string(&doc_a).unwrap(),
        )
        .unwrap();
        fs::write(
            dir.path().join("c/Tasks/b.json"),
            serde_json::to_string(&doc_b).unwrap(),
        )
        .unwrap();

        let report = embed(&script, &folders).unwrap();
        assert!(report.success);
        assert_eq!(report.updated_files, 2);
        assert_eq!(report.total_updates, 3);

        let expected = BASE64.encode("return true;");
        let a: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("c/Tasks/a.json")).unwrap())
                .unwrap();
        assert_eq!(a["steps"][0]["code"], json!(expected));
        assert_eq!(a["fallback"]["code"], json!(expected));
        // Non-matching location untouched.
        assert_eq!(a["steps"][1]["code"], json!("other"));
    }

    #[test]
    fn base64_round_trips_script_bytes() {
        let dir = TempDir::new().unwrap();
        let folders = folders(&dir);

        let script = dir.path().join("src/R.csx");
        fs::create_dir_all(script.parent().unwrap()).unwrap();
        let original = "var x = \"üçé\";\nreturn x;";
        fs::write(&script, original).unwrap();

        fs::write(
            dir.path().join("c/Tasks/t.json"),
            serde_json::to_string(&json!({
                "site": {"location": "./src/R.csx", "code": ""}
            }))
            .unwrap(),
        )
        .unwrap();

        embed(&script, &folders).unwrap();
        let doc: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("c/Tasks/t.json")).unwrap())
                .unwrap();
        let decoded = BASE64
            .decode(doc["site"]["code"].as_str().unwrap())
            .unwrap();
        assert_eq!(decoded, original.as_bytes());
    }

    #[test]
    fn nat_encoding_stores_literal_text() {
        let dir = TempDir::new().unwrap();
        let folders = folders(&dir);

        let script = dir.path().join("src/R.csx");
        fs::create_dir_all(script.parent().unwrap()).unwrap();
        fs::write(&script, "plain text").unwrap();

        fs::write(
            dir.path().join("c/Tasks/t.json"),
            serde_json::to_string(&json!({
                "a": {"location": "./src/R.csx", "code": "", "encoding": "NAT"},
                "b": {"location": "./src/R.csx", "code": "", "encoding": "B64"},
                "c": {"location": "./src/R.csx", "code": ""}
            }))
            .unwrap(),
        )
        .unwrap();

        embed(&script, &folders).unwrap();
        let doc: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("c/Tasks/t.json")).unwrap())
                .unwrap();
        assert_eq!(doc["a"]["code"], json!("plain text"));
        let expected = BASE64.encode("plain text");
        assert_eq!(doc["b"]["code"], json!(expected));
        // Missing tag defaults to Base64.
        assert_eq!(doc["c"]["code"], json!(expected));
    }

    #[test]
    fn malformed_candidate_does_not_block_sibling_updates() {
        let dir = TempDir::new().unwrap();
        let folders = folders(&dir);

        let script = dir.path().join("src/R.csx");
        fs::create_dir_all(script.parent().unwrap()).unwrap();
        fs::write(&script, "return 0;").unwrap();

        // Malformed file that mentions the script, ordered before the
        // valid one.
        fs::write(dir.path().join("c/Tasks/a_broken.json"), "{ R.csx").unwrap();
        fs::write(
            dir.path().join("c/Tasks/z_valid.json"),
            serde_json::to_string(&json!({
                "site": {"location": "./src/R.csx", "code": ""}
            }))
            .unwrap(),
        )
        .unwrap();

        let report = embed(&script, &folders).unwrap();
        assert!(report.success);
        assert_eq!(report.updated_files, 1);
        assert_eq!(report.total_updates, 1);

        let doc: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("c/Tasks/z_valid.json")).unwrap())
                .unwrap();
        assert_eq!(doc["site"]["code"], json!(BASE64.encode("return 0;")));
    }

    #[test]
    fn unreferenced_script_is_a_skip_not_a_failure() {
        let dir = TempDir::new().unwrap();
        let folders = folders(&dir);

        let script = dir.path().join("src/Nobody.csx");
        fs::create_dir_all(script.parent().unwrap()).unwrap();
        fs::write(&script, "x").unwrap();

        let report = embed(&script, &folders).unwrap();
        assert!(!report.success);
        assert_eq!(report.total_updates, 0);
    }

    #[test]
    fn file_without_matching_site_is_not_rewritten() {
        let dir = TempDir::new().unwrap();
        let folders = folders(&dir);

        let script = dir.path().join("src/R.csx");
        fs::create_dir_all(script.parent().unwrap()).unwrap();
        fs::write(&script, "x").unwrap();

        // Mentions the basename in a comment field but has no site.
        let path = dir.path().join("c/Tasks/t.json");
        let original = r#"{"note": "uses R.csx someday"}"#;
        fs::write(&path, original).unwrap();

        let report = embed(&script, &folders).unwrap();
        assert!(!report.success);
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }
}
