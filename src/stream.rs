//! Streaming batch API: emit one outcome per document as it finishes.
//!
//! Unlike [`crate::convert::convert_tree`], which returns only after the last
//! document, [`convert_tree_stream`] yields a [`FileOutcome`] for each
//! discovered file. Files are still handled strictly one after another: the
//! next renderer is not started until the stream is polled again after the
//! previous outcome.
//!
//! Setup (creating the output root, discovery) runs eagerly, so fatal errors
//! surface from the call itself rather than from the stream.

use crate::config::BatchConfig;
use crate::convert::process_file;
use crate::error::BatchError;
use crate::output::FileOutcome;
use crate::pipeline::discover;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of per-file outcomes, in discovery order.
pub type OutcomeStream = Pin<Box<dyn Stream<Item = FileOutcome> + Send>>;

/// Prepare a run and return the stream of its per-file outcomes.
///
/// `on_run_complete` is not fired for streamed runs; the caller owns the end
/// of the stream.
///
/// # Returns
/// - `Ok(OutcomeStream)`: one item per discovered document
/// - `Err(BatchError)`: output root not creatable, input root missing or unreadable
pub async fn convert_tree_stream(config: &BatchConfig) -> Result<OutcomeStream, BatchError> {
    info!(
        "Starting batch: {} → {} at {} DPI",
        config.input_root.display(),
        config.output_root.display(),
        config.dpi
    );

    // ── Ensure output root ───────────────────────────────────────────────
    if !config.dry_run {
        tokio::fs::create_dir_all(&config.output_root)
            .await
            .map_err(|e| BatchError::OutputRootCreateFailed {
                path: config.output_root.clone(),
                source: e,
            })?;
    }

    // ── Discover sources ─────────────────────────────────────────────────
    let root = config.input_root.clone();
    let extension = config.source_extension.clone();
    let sources =
        tokio::task::spawn_blocking(move || discover::discover_sources(&root, &extension))
            .await
            .map_err(|e| BatchError::Internal(format!("Discovery task panicked: {}", e)))??;

    let total = sources.len();
    if total == 0 {
        info!(
            "No .{} files found in {}",
            config.source_extension,
            config.input_root.display()
        );
    } else {
        info!("Found {} .{} files", total, config.source_extension);
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total);
    }

    // ── One file at a time ───────────────────────────────────────────────
    let config = Arc::new(config.clone());
    let outcomes = stream::iter(sources.into_iter().enumerate()).then(move |(index, source)| {
        let config = Arc::clone(&config);
        async move { process_file(source, index, total, &config).await }
    });

    Ok(Box::pin(outcomes))
}
