//! Batch entry points: discover, check, convert one, convert the tree.
//!
//! [`convert_tree`] is the whole run: it drains
//! [`crate::stream::convert_tree_stream`] into a [`RunSummary`], logs the
//! summary line and fires `on_run_complete`. Use the stream directly to react
//! to each file as it finishes.

use crate::config::BatchConfig;
use crate::error::{BatchError, FileError};
use crate::output::{FileOutcome, FileStatus, RunSummary};
use crate::pipeline::discover::discover_sources;
use crate::pipeline::template::TemplateValues;
use crate::pipeline::{existing, rasterize, target::ConversionTarget};
use crate::stream::convert_tree_stream;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Run the whole batch: every discovered document is skipped, planned,
/// converted, or recorded as failed.
///
/// # Errors
/// Returns `Err(BatchError)` only for fatal errors:
/// - output root cannot be created
/// - input root missing, not a directory, or unreadable
///
/// Per-file failures are tallied in the returned summary and never abort the
/// run.
pub async fn convert_tree(config: &BatchConfig) -> Result<RunSummary, BatchError> {
    let start = Instant::now();
    let mut outcomes = convert_tree_stream(config).await?;

    let mut summary = RunSummary::default();
    while let Some(outcome) = outcomes.next().await {
        summary.discovered += 1;
        summary.record(&outcome);
    }
    summary.total_duration_ms = start.elapsed().as_millis() as u64;

    info!("{}", summary.summary_line());

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(&summary);
    }

    Ok(summary)
}

/// Synchronous wrapper around [`convert_tree`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_tree_sync(config: &BatchConfig) -> Result<RunSummary, BatchError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| BatchError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_tree(config))
}

/// List the source documents under `config.input_root`.
pub fn discover(config: &BatchConfig) -> Result<Vec<PathBuf>, BatchError> {
    discover_sources(&config.input_root, &config.source_extension)
}

/// Whether images for `source` already exist under `config.output_root`.
///
/// Never fails: anything that prevents the check reads as `false`.
pub fn is_converted(source: impl AsRef<Path>, config: &BatchConfig) -> bool {
    existing::is_already_converted(
        source.as_ref(),
        &config.input_root,
        &config.output_root,
        &config.image_extension,
    )
}

/// Convert a single document, regardless of existing output.
///
/// Creates the mirrored output directory, runs the renderer and waits for it.
/// Returns the target the images were written under.
pub async fn convert_file(
    source: impl AsRef<Path>,
    config: &BatchConfig,
) -> Result<ConversionTarget, FileError> {
    let source = source.as_ref();
    let target = ConversionTarget::derive(source, &config.input_root, &config.output_root)?;
    render_to_target(source, &target, config).await?;
    Ok(target)
}

/// Skip check, dry-run check, then conversion for one discovered file.
///
/// Always returns an outcome; failures are logged and recorded, not
/// propagated.
pub(crate) async fn process_file(
    source: PathBuf,
    index: usize,
    total: usize,
    config: &BatchConfig,
) -> FileOutcome {
    let start = Instant::now();
    let cb = config.progress_callback.as_ref();

    if let Some(cb) = cb {
        cb.on_file_start(&source, index, total);
    }

    let target = match ConversionTarget::derive(&source, &config.input_root, &config.output_root)
    {
        Ok(t) => t,
        Err(e) => {
            error!("Cannot convert {}: {}", source.display(), e);
            if let Some(cb) = cb {
                cb.on_file_failed(&source, index, total, &e);
            }
            return FileOutcome {
                source,
                target: None,
                status: FileStatus::Failed,
                error: Some(e),
                duration_ms: start.elapsed().as_millis() as u64,
            };
        }
    };

    let (status, error) = if config.skip_existing && output_exists(&target, config).await {
        info!("Skipping already converted: {}", source.display());
        if let Some(cb) = cb {
            cb.on_file_skipped(&source, index, total);
        }
        (FileStatus::Skipped, None)
    } else if config.dry_run {
        info!(
            "Would convert: {} → {}",
            source.display(),
            target.prefix.display()
        );
        if let Some(cb) = cb {
            cb.on_file_planned(&source, index, total);
        }
        (FileStatus::Planned, None)
    } else {
        match render_to_target(&source, &target, config).await {
            Ok(()) => {
                if let Some(cb) = cb {
                    cb.on_file_converted(
                        &source,
                        index,
                        total,
                        start.elapsed().as_millis() as u64,
                    );
                }
                (FileStatus::Converted, None)
            }
            Err(e) => {
                error!("Conversion failed: {}", source.display());
                error!("{}", e);
                if let Some(cb) = cb {
                    cb.on_file_failed(&source, index, total, &e);
                }
                (FileStatus::Failed, Some(e))
            }
        }
    };

    FileOutcome {
        source,
        target: Some(target),
        status,
        error,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

/// Run the skip check off the async worker threads.
async fn output_exists(target: &ConversionTarget, config: &BatchConfig) -> bool {
    let target = target.clone();
    let extension = config.image_extension.clone();
    match tokio::task::spawn_blocking(move || existing::has_existing_output(&target, &extension))
        .await
    {
        Ok(found) => found,
        Err(e) => {
            warn!("Skip check task failed: {}", e);
            false
        }
    }
}

/// Create the target directory and run the renderer into it.
async fn render_to_target(
    source: &Path,
    target: &ConversionTarget,
    config: &BatchConfig,
) -> Result<(), FileError> {
    tokio::fs::create_dir_all(&target.directory)
        .await
        .map_err(|e| FileError::CreateDirFailed {
            dir: target.directory.clone(),
            detail: e.to_string(),
        })?;

    let values = TemplateValues {
        dpi: config.dpi,
        input: source,
        output: &target.prefix,
    };

    info!("Converting: {}", source.display());
    info!("Executing: {}", config.command_template.render(&values));

    let argv = config.command_template.to_argv(&values);
    rasterize::run_renderer(source, &argv, config.command_timeout_secs).await?;

    info!("Converted: {}", source.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test(flavor = "current_thread")]
    async fn skip_check_sees_existing_pages() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        fs::create_dir_all(output.join("sub")).unwrap();

        let config = BatchConfig::builder()
            .input_root(&input)
            .output_root(&output)
            .build()
            .unwrap();
        let target =
            ConversionTarget::derive(&input.join("sub/a.pdf"), &input, &output).unwrap();

        assert!(!output_exists(&target, &config).await);
        fs::write(output.join("sub/a-1.png"), b"").unwrap();
        assert!(output_exists(&target, &config).await);
    }
}
