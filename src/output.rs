//! Result types produced by a batch run.

use crate::error::FileError;
use crate::pipeline::target::ConversionTarget;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happened to one source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// The renderer ran and exited with status zero.
    Converted,
    /// Images for this document were already present.
    Skipped,
    /// Dry run: the document would have been converted.
    Planned,
    /// Conversion was attempted and failed; see [`FileOutcome::error`].
    Failed,
}

/// Per-file record emitted by [`crate::stream::convert_tree_stream`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    pub source: PathBuf,
    /// `None` only when no target could be derived for `source`.
    pub target: Option<ConversionTarget>,
    pub status: FileStatus,
    /// Present iff `status == Failed`.
    pub error: Option<FileError>,
    /// Wall-clock time spent on this file, including the renderer run.
    pub duration_ms: u64,
}

/// A failed document as listed in the run summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFailure {
    pub source: PathBuf,
    pub error: FileError,
}

/// Counts accumulated over one pass of the tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Source documents found under the input root.
    pub discovered: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Dry run only.
    pub planned: usize,
    pub failures: Vec<FileFailure>,
    pub total_duration_ms: u64,
}

impl RunSummary {
    /// Fold one file's outcome into the counters.
    pub fn record(&mut self, outcome: &FileOutcome) {
        match outcome.status {
            FileStatus::Converted => self.converted += 1,
            FileStatus::Skipped => self.skipped += 1,
            FileStatus::Planned => self.planned += 1,
            FileStatus::Failed => {
                self.failed += 1;
                if let Some(ref error) = outcome.error {
                    self.failures.push(FileFailure {
                        source: outcome.source.clone(),
                        error: error.clone(),
                    });
                }
            }
        }
    }

    /// Documents that reached a final state.
    pub fn processed(&self) -> usize {
        self.converted + self.skipped + self.failed + self.planned
    }

    /// One-line human summary, as logged at the end of a run.
    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "Done: {} converted, {} skipped, {} failed",
            self.converted, self.skipped, self.failed
        );
        if self.planned > 0 {
            line.push_str(&format!(", {} planned (dry run)", self.planned));
        }
        line.push_str(&format!(" ({} found)", self.discovered));
        line
    }
}
