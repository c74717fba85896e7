//! The delete-then-publish reconciliation engine.
//!
//! Each selected definition runs through a small state machine:
//!
//! ```text
//! START → missing key/version            → SKIPPED
//! START → lookup → found → delete → publish → UPDATED | FAILED
//! START → lookup → not found      → publish → CREATED | FAILED
//! ```
//!
//! Definitions are reconciled strictly one at a time; one item's failure
//! never halts the batch. After the batch, a single best-effort
//! reinitialize call asks the engine to reload — its failure is a warning,
//! never a batch failure.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use flowsync_index::schema_for_flow;

use crate::discovery::DiscoveredFolders;
use crate::metadata::{read_definition, resolve_flow};
use crate::report::BatchReport;

/// Boxed error for collaborator seams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The relational index collaborator.
#[async_trait]
pub trait InstanceIndex: Send + Sync {
    /// Newest instance id for `key` within `schema`, or `None`.
    ///
    /// Version is not part of the predicate: the index tracks one "latest"
    /// instance per key, and the answer only decides whether something must
    /// be deleted before republishing.
    async fn latest_instance_id(
        &self,
        schema: &str,
        key: &str,
    ) -> std::result::Result<Option<String>, BoxError>;

    /// Delete one instance row by id within `schema`.
    async fn delete_instance(&self, schema: &str, id: &str) -> std::result::Result<(), BoxError>;
}

/// The publish API collaborator.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish a full definition payload, returning the new instance id.
    /// The error's `Display` is the message surfaced in failure reports.
    async fn publish(&self, payload: &Value) -> std::result::Result<String, BoxError>;

    /// Best-effort reload of the remote engine.
    async fn reinitialize(&self) -> bool;
}

#[async_trait]
impl InstanceIndex for flowsync_index::IndexClient {
    async fn latest_instance_id(
        &self,
        schema: &str,
        key: &str,
    ) -> std::result::Result<Option<String>, BoxError> {
        Ok(flowsync_index::IndexClient::latest_instance_id(self, schema, key).await?)
    }

    async fn delete_instance(&self, schema: &str, id: &str) -> std::result::Result<(), BoxError> {
        flowsync_index::IndexClient::delete_instance(self, schema, id).await?;
        Ok(())
    }
}

#[async_trait]
impl Publisher for flowsync_client::ApiClient {
    async fn publish(&self, payload: &Value) -> std::result::Result<String, BoxError> {
        let receipt = flowsync_client::ApiClient::publish(self, payload).await?;
        Ok(receipt.instance_id)
    }

    async fn reinitialize(&self) -> bool {
        flowsync_client::ApiClient::reinitialize(self).await
    }
}

/// What to do when deleting a stale instance fails.
///
/// The default favors forward progress: the delete failure is logged and
/// the publish is still attempted, since publish is the definitive
/// success signal and the next run will re-detect any leftover state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Log the delete failure at `warn` and still publish.
    #[default]
    Proceed,
    /// Treat the delete failure as the item's failure.
    Abort,
}

/// Replace-or-add behavior for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Delete any stale instance, then publish (the `update` command).
    Replace,
    /// Publish only definitions with no indexed instance; never delete
    /// (the `sync` command).
    AddMissing,
}

/// Terminal state of one definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    /// Published with no prior instance.
    Created,
    /// A stale instance existed and was replaced.
    Updated,
    /// Not processed, with the reason (not an error).
    Skipped(String),
    /// Processing failed, with the user-facing message.
    Failed(String),
}

/// Outcome of reconciling one definition.
#[derive(Debug, Clone)]
pub struct ItemResult {
    pub file: std::path::PathBuf,
    pub flow: String,
    pub key: Option<String>,
    pub version: Option<String>,
    pub status: ItemStatus,
    /// True when a prior indexed instance existed for the key.
    pub was_deleted: bool,
    /// Instance id returned by a successful publish.
    pub instance_id: Option<String>,
}

/// Reconciles definitions against the index and the publish API.
pub struct Reconciler<'a, I, P> {
    index: &'a I,
    publisher: &'a P,
    delete_policy: DeletePolicy,
}

impl<'a, I: InstanceIndex, P: Publisher> Reconciler<'a, I, P> {
    pub fn new(index: &'a I, publisher: &'a P) -> Self {
        Self {
            index,
            publisher,
            delete_policy: DeletePolicy::default(),
        }
    }

    /// Override the delete-failure policy.
    pub fn delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    /// Reconcile one definition file. Never returns an error: every
    /// failure is folded into the result's status.
    pub async fn reconcile_file(
        &self,
        path: &Path,
        folders: &DiscoveredFolders,
        mode: ReconcileMode,
    ) -> ItemResult {
        let definition = match read_definition(path) {
            Ok(def) => def,
            Err(e) => {
                return ItemResult {
                    file: path.to_path_buf(),
                    flow: flowsync_config::DEFAULT_FLOW.to_string(),
                    key: None,
                    version: None,
                    status: ItemStatus::Failed(e.to_string()),
                    was_deleted: false,
                    instance_id: None,
                };
            }
        };

        let flow = resolve_flow(&definition, path, folders);
        let mut result = ItemResult {
            file: path.to_path_buf(),
            flow: flow.clone(),
            key: definition.key.clone(),
            version: definition.version.clone(),
            status: ItemStatus::Skipped(String::new()),
            was_deleted: false,
            instance_id: None,
        };

        let key = match definition.key.as_deref() {
            Some(key) if definition.is_publishable() => key,
            _ => {
                result.status = ItemStatus::Skipped("missing key or version".to_string());
                return result;
            }
        };
        let schema = schema_for_flow(&flow);

        let existing = match self.index.latest_instance_id(&schema, key).await {
            Ok(existing) => existing,
            Err(e) => {
                result.status = ItemStatus::Failed(format!("index lookup failed: {e}"));
                return result;
            }
        };

        if mode == ReconcileMode::AddMissing && existing.is_some() {
            result.status = ItemStatus::Skipped("already present".to_string());
            return result;
        }

        if let Some(instance_id) = &existing {
            result.was_deleted = true;
            if let Err(e) = self.index.delete_instance(&schema, instance_id).await {
                match self.delete_policy {
                    DeletePolicy::Proceed => {
                        tracing::warn!(
                            key,
                            instance_id,
                            error = %e,
                            "failed to delete stale instance, publishing anyway"
                        );
                    }
                    DeletePolicy::Abort => {
                        result.status =
                            ItemStatus::Failed(format!("failed to delete stale instance: {e}"));
                        return result;
                    }
                }
            }
        }

        match self.publisher.publish(&definition.payload).await {
            Ok(instance_id) => {
                tracing::info!(key, flow = %flow, instance_id, "definition published");
                result.instance_id = Some(instance_id);
                result.status = if result.was_deleted {
                    ItemStatus::Updated
                } else {
                    ItemStatus::Created
                };
            }
            Err(e) => {
                result.status = ItemStatus::Failed(e.to_string());
            }
        }
        result
    }

    /// Reconcile a batch of definition files sequentially.
    ///
    /// If at least one publish succeeded, a best-effort reinitialize call
    /// follows; its failure is recorded on the report but never flips the
    /// batch outcome.
    pub async fn reconcile_batch(
        &self,
        files: &[std::path::PathBuf],
        folders: &DiscoveredFolders,
        mode: ReconcileMode,
        report: &mut BatchReport,
    ) -> Vec<ItemResult> {
        let mut results = Vec::with_capacity(files.len());
        for file in files {
            let result = self.reconcile_file(file, folders, mode).await;
            report.record(&result);
            results.push(result);
        }

        let any_published = results
            .iter()
            .any(|r| matches!(r.status, ItemStatus::Created | ItemStatus::Updated));
        if any_published {
            let ok = self.publisher.reinitialize().await;
            if !ok {
                tracing::warn!("remote reinitialize failed after publish");
            }
            report.reinitialized = Some(ok);
        }

        results
    }
}
