//! Pipeline stages for batch PDF rasterisation.
//!
//! Each submodule implements exactly one step of the per-file flow, so each is
//! testable on its own and the orchestration in [`crate::convert`] stays a
//! short loop.
//!
//! ## Data Flow
//!
//! ```text
//! discover ──▶ target ──▶ existing ──▶ template ──▶ rasterize
//! (walkdir)   (mirror)   (skip?)      (argv)       (child process)
//! ```
//!
//! 1. [`discover`]: walk the input root for source documents
//! 2. [`target`]: map a source path to its mirrored output prefix
//! 3. [`existing`]: prefix-match the target directory for produced images
//! 4. [`template`]: substitute `{dpi}`, `{input}`, `{output}` and split to argv
//! 5. [`rasterize`]: spawn the renderer and wait for its exit status

pub mod discover;
pub mod existing;
pub mod rasterize;
pub mod target;
pub mod template;
