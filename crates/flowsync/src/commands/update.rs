//! Update command - delete-then-publish reconciliation.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use console::style;

use flowsync_config::Manifest;
use flowsync_engine::{
    BatchReport, DeletePolicy, DiscoveredFolders, ReconcileMode, Reconciler, Selection, embed,
    select_definitions, select_scripts,
};

use super::Context;

/// Arguments for the update command.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Reconcile a single definition file (absolute or project-relative)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Reconcile every definition under every discovered folder
    #[arg(short, long)]
    pub all: bool,

    /// Fail an item when its stale instance cannot be deleted
    /// (default: log and publish anyway)
    #[arg(long)]
    pub strict_delete: bool,
}

impl UpdateArgs {
    /// Explicit file overrides exhaustive, which overrides the git default.
    fn selection(&self) -> Selection {
        if let Some(file) = &self.file {
            Selection::Explicit(file.clone())
        } else if self.all {
            Selection::All
        } else {
            Selection::GitDiff
        }
    }
}

/// Run the update command.
pub async fn run(args: UpdateArgs, ctx: &Context) -> Result<()> {
    let domain = super::active_domain()?;
    let manifest = Manifest::load(&ctx.project_root)?;
    let folders = DiscoveredFolders::discover(&ctx.project_root, &manifest);
    folders.ensure_any()?;

    let mut report = BatchReport::default();

    // Scripts first, so definitions carry fresh embedded code. Explicit
    // single-definition runs skip embedding.
    if args.file.is_none() {
        let scripts = select_scripts(&args.selection(), &ctx.project_root)?;
        embed_scripts(&scripts, &folders, &mut report);
    }

    let selection = args.selection();
    let files = select_definitions(&selection, &ctx.project_root, &folders)?;
    if files.is_empty() && selection == Selection::GitDiff && report.total == 0 {
        return super::finish(&report);
    }
    println!("{} definition file(s) selected", files.len());

    let (index, api) = super::connect(&domain).await?;
    let policy = if args.strict_delete {
        DeletePolicy::Abort
    } else {
        DeletePolicy::Proceed
    };
    let reconciler = Reconciler::new(&index, &api).delete_policy(policy);
    reconciler
        .reconcile_batch(&files, &folders, ReconcileMode::Replace, &mut report)
        .await;

    super::finish(&report)
}

/// Embed a set of scripts, folding results into the report.
pub(crate) fn embed_scripts(
    scripts: &[PathBuf],
    folders: &DiscoveredFolders,
    report: &mut BatchReport,
) {
    for script in scripts {
        match embed(script, folders) {
            Ok(result) => {
                if result.success {
                    println!(
                        "  {} {} → {} site(s) in {} file(s)",
                        style("✓").green(),
                        script.display(),
                        result.total_updates,
                        result.updated_files
                    );
                } else {
                    println!(
                        "  {} {} → no referencing definition",
                        style("○").yellow(),
                        script.display()
                    );
                }
                report.record_embed(&result);
            }
            Err(e) => {
                println!("  {} {} → {}", style("✗").red(), script.display(), e);
                report.record_failure("Scripts", script.clone(), e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(file: Option<&str>, all: bool) -> UpdateArgs {
        UpdateArgs {
            file: file.map(PathBuf::from),
            all,
            strict_delete: false,
        }
    }

    #[test]
    fn explicit_file_wins_over_exhaustive() {
        assert_eq!(
            args(Some("c/Tasks/t.json"), true).selection(),
            Selection::Explicit(PathBuf::from("c/Tasks/t.json"))
        );
    }

    #[test]
    fn exhaustive_wins_over_git_default() {
        assert_eq!(args(None, true).selection(), Selection::All);
    }

    #[test]
    fn no_flags_defaults_to_git_diff() {
        assert_eq!(args(None, false).selection(), Selection::GitDiff);
        assert_ne!(args(Some("t.json"), false).selection(), Selection::GitDiff);
    }
}
