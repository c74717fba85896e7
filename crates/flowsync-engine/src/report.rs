//! Batch result aggregation.
//!
//! Every run ends in a [`BatchReport`]: per-component-type counters, the
//! ordered list of failures, and (for embedding runs) per-script update
//! counts. The report drives the exit-status decision — "up to date" when
//! selection produced nothing is distinct from a successful run over N
//! files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use flowsync_config::ComponentType;

use crate::embed::EmbedReport;
use crate::reconcile::{ItemResult, ItemStatus};

/// Counters for one component type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeStats {
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// One recorded failure, in encounter order.
#[derive(Debug, Clone)]
pub struct Failure {
    /// Component type label (or raw flow id for unknown flows).
    pub component_type: String,
    /// The file being processed when the failure occurred.
    pub file: PathBuf,
    /// Failure message as it should surface to the user.
    pub message: String,
}

/// Overall classification of a finished batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Selection produced zero candidates; nothing was attempted.
    UpToDate,
    /// At least one item processed, none failed.
    Success,
    /// At least one item failed.
    Failed,
}

/// Aggregated results of one run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    stats: BTreeMap<String, TypeStats>,
    /// Failures in the order encountered.
    pub failures: Vec<Failure>,
    /// Total items processed (including skips).
    pub total: usize,
    /// Result of the post-batch reinitialize call, when one was made.
    pub reinitialized: Option<bool>,
    /// Per-script embedding site counts, for embedding runs.
    pub script_updates: Vec<(PathBuf, usize)>,
}

impl BatchReport {
    /// Record one reconciliation result.
    pub fn record(&mut self, item: &ItemResult) {
        self.total += 1;
        let label = type_label(&item.flow);
        let stats = self.stats.entry(label.clone()).or_default();
        match &item.status {
            ItemStatus::Created => stats.created += 1,
            ItemStatus::Updated => stats.updated += 1,
            ItemStatus::Skipped(_) => stats.skipped += 1,
            ItemStatus::Failed(message) => {
                stats.failed += 1;
                self.failures.push(Failure {
                    component_type: label,
                    file: item.file.clone(),
                    message: message.clone(),
                });
            }
        }
    }

    /// Record one embedding result.
    ///
    /// An unreferenced script counts as skipped, never as failed.
    pub fn record_embed(&mut self, report: &EmbedReport) {
        self.total += 1;
        let stats = self.stats.entry("Scripts".to_string()).or_default();
        if report.success {
            stats.updated += 1;
            self.script_updates
                .push((report.script.clone(), report.total_updates));
        } else {
            stats.skipped += 1;
        }
    }

    /// Record a failure that happened outside reconciliation (e.g. an
    /// unreadable script during embedding).
    pub fn record_failure(&mut self, component_type: &str, file: PathBuf, message: String) {
        self.total += 1;
        self.stats
            .entry(component_type.to_string())
            .or_default()
            .failed += 1;
        self.failures.push(Failure {
            component_type: component_type.to_string(),
            file,
            message,
        });
    }

    /// Per-type counters, ordered by type label.
    pub fn stats(&self) -> impl Iterator<Item = (&str, &TypeStats)> {
        self.stats.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Totals across all component types.
    pub fn totals(&self) -> TypeStats {
        self.stats
            .values()
            .fold(TypeStats::default(), |mut acc, s| {
                acc.created += s.created;
                acc.updated += s.updated;
                acc.failed += s.failed;
                acc.skipped += s.skipped;
                acc
            })
    }

    /// Classify the finished batch.
    pub fn outcome(&self) -> BatchOutcome {
        if self.total == 0 {
            BatchOutcome::UpToDate
        } else if self.totals().failed > 0 {
            BatchOutcome::Failed
        } else {
            BatchOutcome::Success
        }
    }
}

/// Reporting label for a flow id.
fn type_label(flow: &str) -> String {
    ComponentType::from_flow_id(flow)
        .map(|ty| ty.label().to_string())
        .unwrap_or_else(|| flow.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(flow: &str, status: ItemStatus) -> ItemResult {
        ItemResult {
            file: PathBuf::from("t.json"),
            flow: flow.to_string(),
            key: Some("k".to_string()),
            version: Some("1.0.0".to_string()),
            status,
            was_deleted: false,
            instance_id: None,
        }
    }

    #[test]
    fn empty_batch_is_up_to_date() {
        let report = BatchReport::default();
        assert_eq!(report.outcome(), BatchOutcome::UpToDate);
    }

    #[test]
    fn counters_per_component_type() {
        let mut report = BatchReport::default();
        report.record(&item("sys-tasks", ItemStatus::Created));
        report.record(&item("sys-tasks", ItemStatus::Updated));
        report.record(&item("sys-flows", ItemStatus::Skipped("no key".to_string())));

        let tasks = report
            .stats()
            .find(|(label, _)| *label == "Tasks")
            .unwrap()
            .1;
        assert_eq!(tasks.created, 1);
        assert_eq!(tasks.updated, 1);

        let flows = report
            .stats()
            .find(|(label, _)| *label == "Workflows")
            .unwrap()
            .1;
        assert_eq!(flows.skipped, 1);

        assert_eq!(report.outcome(), BatchOutcome::Success);
    }

    #[test]
    fn failures_preserve_order_and_flip_outcome() {
        let mut report = BatchReport::default();
        report.record(&item("sys-tasks", ItemStatus::Failed("first".to_string())));
        report.record(&item("sys-views", ItemStatus::Failed("second".to_string())));
        report.record(&item("sys-tasks", ItemStatus::Created));

        assert_eq!(report.outcome(), BatchOutcome::Failed);
        let messages: Vec<_> = report.failures.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[test]
    fn unknown_flow_keeps_raw_id_as_label() {
        let mut report = BatchReport::default();
        report.record(&item("custom-flow", ItemStatus::Created));
        assert!(report.stats().any(|(label, _)| label == "custom-flow"));
    }

    #[test]
    fn embed_results_count_as_updated_or_skipped() {
        let mut report = BatchReport::default();
        report.record_embed(&EmbedReport {
            script: PathBuf::from("a.csx"),
            success: true,
            updated_files: 2,
            total_updates: 3,
            per_file: vec![],
        });
        report.record_embed(&EmbedReport {
            script: PathBuf::from("b.csx"),
            success: false,
            updated_files: 0,
            total_updates: 0,
            per_file: vec![],
        });

        let scripts = report
            .stats()
            .find(|(label, _)| *label == "Scripts")
            .unwrap()
            .1;
        assert_eq!(scripts.updated, 1);
        assert_eq!(scripts.skipped, 1);
        assert_eq!(report.script_updates, vec![(PathBuf::from("a.csx"), 3)]);
        assert_eq!(report.outcome(), BatchOutcome::Success);
    }
}
