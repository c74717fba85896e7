//! Embed command - run the script embedder on its own.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use flowsync_config::Manifest;
use flowsync_engine::{BatchReport, DiscoveredFolders, Selection, select_scripts};

use super::Context;
use super::update::embed_scripts;

/// Arguments for the embed command.
#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Embed a single script file (absolute or project-relative)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Embed every script under the project's src trees
    #[arg(short, long)]
    pub all: bool,
}

impl EmbedArgs {
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

/// Run the embed command.
pub async fn run(args: EmbedArgs, ctx: &Context) -> Result<()> {
    let manifest = Manifest::load(&ctx.project_root)?;
    let folders = DiscoveredFolders::discover(&ctx.project_root, &manifest);
    folders.ensure_any()?;

    let scripts = select_scripts(&args.selection(), &ctx.project_root)?;
    let mut report = BatchReport::default();
    embed_scripts(&scripts, &folders, &mut report);

    super::finish(&report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_file_wins_over_exhaustive() {
        let args = EmbedArgs {
            file: Some(PathBuf::from("src/R.csx")),
            all: true,
        };
        assert_eq!(
            args.selection(),
            Selection::Explicit(PathBuf::from("src/R.csx"))
        );
    }

    #[test]
    fn flags_never_fall_back_to_git_diff() {
        let all = EmbedArgs { file: None, all: true };
        assert_eq!(all.selection(), Selection::All);

        let none = EmbedArgs { file: None, all: false };
        assert_eq!(none.selection(), Selection::GitDiff);
    }
}
