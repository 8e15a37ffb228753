//! Progress-callback trait for per-file batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::BatchConfigBuilder::progress_callback`] to receive events
//! as the run walks the tree. The library itself only emits `tracing` events;
//! anything richer (a terminal progress bar, a status line in a GUI, a
//! database row per file) lives behind this trait.
//!
//! # Example
//!
//! ```rust
//! use pdf2png::{BatchConfig, BatchProgressCallback};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     converted: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_file_converted(&self, source: &Path, index: usize, total: usize, _ms: u64) {
//!         self.converted.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("[{}/{}] {}", index + 1, total, source.display());
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { converted: AtomicUsize::new(0) });
//!
//! let config = BatchConfig::builder()
//!     .progress_callback(counter as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::FileError;
use crate::output::RunSummary;
use std::path::Path;
use std::sync::Arc;

/// Called by the batch run as it processes each source document.
///
/// Files are processed one at a time, but the trait is `Send + Sync` so a
/// callback can be shared with the task driving the run. All methods have
/// no-op defaults. `index` is 0-based; `total` is the number of discovered
/// documents.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once after discovery, before any file is touched.
    fn on_run_start(&self, total: usize) {
        let _ = total;
    }

    /// Called before the skip check for a file.
    fn on_file_start(&self, source: &Path, index: usize, total: usize) {
        let _ = (source, index, total);
    }

    /// Images for `source` already exist.
    fn on_file_skipped(&self, source: &Path, index: usize, total: usize) {
        let _ = (source, index, total);
    }

    /// Dry run: `source` would be converted.
    fn on_file_planned(&self, source: &Path, index: usize, total: usize) {
        let _ = (source, index, total);
    }

    /// The renderer exited successfully for `source`.
    fn on_file_converted(&self, source: &Path, index: usize, total: usize, duration_ms: u64) {
        let _ = (source, index, total, duration_ms);
    }

    /// Conversion of `source` failed; the run continues.
    fn on_file_failed(&self, source: &Path, index: usize, total: usize, error: &FileError) {
        let _ = (source, index, total, error);
    }

    /// Called once by [`crate::convert::convert_tree`] after the last file.
    fn on_run_complete(&self, summary: &RunSummary) {
        let _ = summary;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::BatchConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        started_total: AtomicUsize,
        starts: AtomicUsize,
        converted: AtomicUsize,
        skipped: AtomicUsize,
        failed: AtomicUsize,
        completed: AtomicUsize,
    }

    impl BatchProgressCallback for TrackingCallback {
        fn on_run_start(&self, total: usize) {
            self.started_total.store(total, Ordering::SeqCst);
        }

        fn on_file_start(&self, _source: &Path, _index: usize, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_skipped(&self, _source: &Path, _index: usize, _total: usize) {
            self.skipped.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_converted(&self, _source: &Path, _index: usize, _total: usize, _ms: u64) {
            self.converted.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_failed(&self, _source: &Path, _index: usize, _total: usize, _e: &FileError) {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }

        fn on_run_complete(&self, summary: &RunSummary) {
            self.completed.store(summary.converted, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        let p = Path::new("a.pdf");
        cb.on_run_start(2);
        cb.on_file_start(p, 0, 2);
        cb.on_file_skipped(p, 0, 2);
        cb.on_file_planned(p, 1, 2);
        cb.on_file_converted(p, 1, 2, 10);
        cb.on_run_complete(&RunSummary::default());
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        let err = FileError::CommandFailed {
            path: PathBuf::from("c.pdf"),
            code: Some(1),
            stderr: String::new(),
        };

        tracker.on_run_start(3);
        tracker.on_file_start(Path::new("a.pdf"), 0, 3);
        tracker.on_file_converted(Path::new("a.pdf"), 0, 3, 120);
        tracker.on_file_start(Path::new("b.pdf"), 1, 3);
        tracker.on_file_skipped(Path::new("b.pdf"), 1, 3);
        tracker.on_file_start(Path::new("c.pdf"), 2, 3);
        tracker.on_file_failed(Path::new("c.pdf"), 2, 3, &err);
        tracker.on_run_complete(&RunSummary {
            converted: 1,
            ..Default::default()
        });

        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.converted.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.skipped.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.failed.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.completed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_run_start(10);
        cb.on_file_start(Path::new("x.pdf"), 0, 10);
    }
}
