//! Rasterisation: run the external renderer for one document.
//!
//! The renderer is spawned directly from the argv produced by
//! [`crate::pipeline::template`]; stdout is discarded and stderr captured so a
//! failed conversion carries the tool's own diagnostics. The call returns only
//! once the child has exited (or the optional timeout fired and the child was
//! killed), which keeps the batch loop strictly one-process-at-a-time.

use crate::error::FileError;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Run `argv` for `source` and wait for it to exit.
///
/// Succeeds only on exit status zero.
pub async fn run_renderer(
    source: &Path,
    argv: &[OsString],
    timeout_secs: Option<u64>,
) -> Result<(), FileError> {
    let (program, args) = argv.split_first().ok_or_else(|| FileError::SpawnFailed {
        path: source.to_path_buf(),
        program: String::new(),
        detail: "empty command line".into(),
    })?;

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| FileError::SpawnFailed {
            path: source.to_path_buf(),
            program: program.to_string_lossy().into_owned(),
            detail: e.to_string(),
        })?;

    let waited = match timeout_secs {
        Some(secs) => timeout(Duration::from_secs(secs), child.wait_with_output())
            .await
            .map_err(|_| FileError::Timeout {
                path: source.to_path_buf(),
                secs,
            })?,
        None => child.wait_with_output().await,
    };

    let output = waited.map_err(|e| FileError::SpawnFailed {
        path: source.to_path_buf(),
        program: program.to_string_lossy().into_owned(),
        detail: format!("failed to wait for process: {e}"),
    })?;

    debug!("{} exited with {}", program.to_string_lossy(), output.status);

    if output.status.success() {
        Ok(())
    } else {
        Err(FileError::CommandFailed {
            path: source.to_path_buf(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn argv(words: &[&str]) -> Vec<OsString> {
        words.iter().map(OsString::from).collect()
    }

    #[tokio::test]
    async fn zero_exit_is_success() {
        let r = run_renderer(Path::new("a.pdf"), &argv(&["sh", "-c", "exit 0"]), None).await;
        assert!(r.is_ok());
    }

    #[tokio::test]
    async fn non_zero_exit_carries_code_and_stderr() {
        let r = run_renderer(
            Path::new("bad.pdf"),
            &argv(&["sh", "-c", "echo 'Syntax Error: broken xref' >&2; exit 3"]),
            None,
        )
        .await;

        match r {
            Err(FileError::CommandFailed { path, code, stderr }) => {
                assert_eq!(path, Path::new("bad.pdf"));
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "Syntax Error: broken xref");
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_spawn_failure() {
        let r = run_renderer(
            Path::new("a.pdf"),
            &argv(&["/definitely/not/a/renderer", "x"]),
            None,
        )
        .await;
        assert!(matches!(r, Err(FileError::SpawnFailed { .. })));
    }

    #[tokio::test]
    async fn empty_argv_is_spawn_failure() {
        let r = run_renderer(Path::new("a.pdf"), &[], None).await;
        assert!(matches!(r, Err(FileError::SpawnFailed { .. })));
    }

    #[tokio::test]
    async fn hung_renderer_times_out() {
        let r = run_renderer(Path::new("slow.pdf"), &argv(&["sleep", "5"]), Some(1)).await;
        assert!(matches!(r, Err(FileError::Timeout { secs: 1, .. })));
    }
}
