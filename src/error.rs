//! Error types for the pdf2png library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`BatchError`]: **fatal**, the run cannot proceed at all (input root
//!   missing, output root cannot be created, invalid command template).
//!   Returned as `Err(BatchError)` from the run entry points.
//!
//! * [`FileError`]: **non-fatal**, a single document failed (renderer exited
//!   non-zero, renderer missing, output directory not creatable) but the rest
//!   of the tree is unaffected. Stored inside [`crate::output::FileOutcome`]
//!   and tallied in [`crate::output::RunSummary`]; the run continues.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2png library.
///
/// Per-file failures use [`FileError`] and never abort a run.
#[derive(Debug, Error)]
pub enum BatchError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input root does not exist or is not a directory.
    #[error("Input directory not found: '{path}'\nCheck the path exists and is a directory.")]
    DirectoryNotFound { path: PathBuf },

    /// Input root exists but its entries cannot be listed.
    #[error("Cannot read input directory '{path}': {detail}")]
    DirectoryUnreadable { path: PathBuf, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Output root could not be created.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputRootCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// The command template could not be parsed.
    #[error("Invalid command template: {0}")]
    InvalidTemplate(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single source document.
///
/// Recorded in [`crate::output::FileOutcome`]; the run moves on to the next
/// file.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum FileError {
    /// The source path does not live under the configured input root, so no
    /// mirrored target can be derived.
    #[error("'{path}' is not inside the input directory '{root}'")]
    OutsideInputRoot { path: PathBuf, root: PathBuf },

    /// The mirrored output directory could not be created.
    #[error("Failed to create output directory '{dir}': {detail}")]
    CreateDirFailed { dir: PathBuf, detail: String },

    /// The renderer process could not be started at all.
    #[error("Failed to start '{program}' for '{path}': {detail}")]
    SpawnFailed {
        path: PathBuf,
        program: String,
        detail: String,
    },

    /// The renderer exited with a non-zero status.
    #[error("Conversion failed for '{path}' (exit code {}): {stderr}", exit_code(.code))]
    CommandFailed {
        path: PathBuf,
        code: Option<i32>,
        stderr: String,
    },

    /// The renderer did not exit within the configured timeout and was killed.
    #[error("Conversion of '{path}' timed out after {secs}s")]
    Timeout { path: PathBuf, secs: u64 },
}

fn exit_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

impl FileError {
    /// The source document this error refers to, where one is known.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            FileError::OutsideInputRoot { path, .. }
            | FileError::SpawnFailed { path, .. }
            | FileError::CommandFailed { path, .. }
            | FileError::Timeout { path, .. } => Some(path),
            FileError::CreateDirFailed { .. } => None,
        }
    }
}
