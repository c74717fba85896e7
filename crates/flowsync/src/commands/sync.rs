//! Sync command - publish definitions missing from the index.

use anyhow::Result;
use clap::Args;

use flowsync_config::Manifest;
use flowsync_engine::{
    BatchReport, DiscoveredFolders, ReconcileMode, Reconciler, Selection, select_definitions,
    select_scripts,
};

use super::Context;
use super::update::embed_scripts;

/// Arguments for the sync command.
#[derive(Args, Debug)]
pub struct SyncArgs {}

/// Run the sync command.
///
/// Exhaustive by design: every script is re-embedded and every definition
/// checked, but nothing already indexed is touched and nothing is ever
/// deleted.
pub async fn run(_args: SyncArgs, ctx: &Context) -> Result<()> {
    let domain = super::active_domain()?;
    let manifest = Manifest::load(&ctx.project_root)?;
    let folders = DiscoveredFolders::discover(&ctx.project_root, &manifest);
    folders.ensure_any()?;

    let mut report = BatchReport::default();

    let scripts = select_scripts(&Selection::All, &ctx.project_root)?;
    embed_scripts(&scripts, &folders, &mut report);

    let files = select_definitions(&Selection::All, &ctx.project_root, &folders)?;
    println!("{} definition file(s) found", files.len());

    let (index, api) = super::connect(&domain).await?;
    let reconciler = Reconciler::new(&index, &api);
    reconciler
        .reconcile_batch(&files, &folders, ReconcileMode::AddMissing, &mut report)
        .await;

    super::finish(&report)
}
