//! Component synchronization and publication engine.
//!
//! Keeps three stores of workflow component definitions consistent: the
//! filesystem tree of JSON definitions (with companion `.csx` scripts), the
//! relational instance index, and the remote publishing API. The pipeline:
//!
//! ```text
//! selector → embedder (script runs) → metadata → reconciler → report
//! ```
//!
//! Discovery is a shared dependency of the selector, the embedder, and
//! flow detection. Reconciliation is strictly sequential per definition;
//! per-item failures are folded into the batch report and never escape the
//! batch loop.

mod discovery;
mod embed;
mod error;
mod metadata;
mod reconcile;
mod report;
mod select;

pub use discovery::DiscoveredFolders;
pub use embed::{EmbedReport, embed, script_location};
pub use error::{EngineError, Result};
pub use metadata::{ComponentDefinition, read_definition, resolve_flow};
pub use reconcile::{
    BoxError, DeletePolicy, InstanceIndex, ItemResult, ItemStatus, Publisher, ReconcileMode,
    Reconciler,
};
pub use report::{BatchOutcome, BatchReport, Failure, TypeStats};
pub use select::{
    DEFINITION_EXT, SCRIPT_EXT, Selection, git_changed_files, is_definition_candidate,
    select_definitions, select_scripts,
};
