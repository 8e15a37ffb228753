//! # pdf2png
//!
//! Batch-rasterise a directory tree of PDF documents into PNG page images.
//!
//! Rendering itself is delegated to an external tool (Poppler's `pdftoppm` by
//! default, or anything else expressible as a command template). This crate
//! owns the batch around it: finding documents, mirroring the input tree under
//! an output root, skipping documents that already have images, running the
//! renderer one document at a time, and reporting what happened.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input root
//!  │
//!  ├─ 1. Discover   walk the tree for *.pdf (any case)
//!  ├─ 2. Target     mirror the relative path under the output root, drop .pdf
//!  ├─ 3. Skip?      any <stem>*.png already in the target directory
//!  ├─ 4. Render     pdftoppm -png -rx 400 -ry 400 "<src>" "<target>"
//!  └─ 5. Summary    converted / skipped / failed
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2png::{convert_tree, BatchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BatchConfig::builder()
//!         .input_root("data/pdf_file")
//!         .output_root("data/pdf_img")
//!         .dpi(400)
//!         .build()?;
//!     let summary = convert_tree(&config).await?;
//!     eprintln!(
//!         "converted {} / skipped {} / failed {}",
//!         summary.converted, summary.skipped, summary.failed
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2png` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2png = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{BatchConfig, BatchConfigBuilder};
pub use convert::{convert_file, convert_tree, convert_tree_sync, discover, is_converted};
pub use error::{BatchError, FileError};
pub use output::{FileFailure, FileOutcome, FileStatus, RunSummary};
pub use pipeline::target::ConversionTarget;
pub use pipeline::template::{CommandTemplate, DEFAULT_COMMAND_TEMPLATE};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{convert_tree_stream, OutcomeStream};
