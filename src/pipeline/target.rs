//! Conversion targets: where a source document's images go.
//!
//! The target of `<input_root>/a/b/Report.PDF` is the prefix
//! `<output_root>/a/b/Report`. The renderer appends its own page suffix and
//! extension (`Report-1.png`, `Report-2.png`, …), so the prefix is all that
//! can be known up front.

use crate::error::FileError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Output location derived from a source path and the configured roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionTarget {
    /// Full output prefix passed to the renderer as `{output}`.
    pub prefix: PathBuf,
    /// Directory the renderer writes into (parent of `prefix`).
    pub directory: PathBuf,
    /// Final component of `prefix` (lossy if not UTF-8); every produced image
    /// name starts with it.
    pub base_name: String,
}

impl ConversionTarget {
    /// Derive the target for `source`.
    ///
    /// `source` must live under `input_root`. The extension is dropped whatever
    /// its case; any other dots in the file name are kept.
    pub fn derive(
        source: &Path,
        input_root: &Path,
        output_root: &Path,
    ) -> Result<Self, FileError> {
        let relative = source
            .strip_prefix(input_root)
            .map_err(|_| FileError::OutsideInputRoot {
                path: source.to_path_buf(),
                root: input_root.to_path_buf(),
            })?;

        let stem = relative
            .file_stem()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| FileError::OutsideInputRoot {
                path: source.to_path_buf(),
                root: input_root.to_path_buf(),
            })?;

        let directory = match relative.parent() {
            Some(parent) => output_root.join(parent),
            None => output_root.to_path_buf(),
        };
        let prefix = directory.join(stem);

        Ok(Self {
            prefix,
            directory,
            base_name: stem.to_string_lossy().into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirrors_relative_directories() {
        let t = ConversionTarget::derive(
            Path::new("data/pdf_file/2024/q1/report.pdf"),
            Path::new("data/pdf_file"),
            Path::new("data/pdf_img"),
        )
        .unwrap();

        assert_eq!(t.prefix, PathBuf::from("data/pdf_img/2024/q1/report"));
        assert_eq!(t.directory, PathBuf::from("data/pdf_img/2024/q1"));
        assert_eq!(t.base_name, "report");
    }

    #[test]
    fn top_level_file_lands_in_output_root() {
        let t = ConversionTarget::derive(
            Path::new("/in/a.pdf"),
            Path::new("/in"),
            Path::new("/out"),
        )
        .unwrap();
        assert_eq!(t.directory, PathBuf::from("/out"));
        assert_eq!(t.prefix, PathBuf::from("/out/a"));
    }

    #[test]
    fn uppercase_extension_is_stripped() {
        let lower =
            ConversionTarget::derive(Path::new("in/doc.pdf"), Path::new("in"), Path::new("out"))
                .unwrap();
        let upper =
            ConversionTarget::derive(Path::new("in/Doc.PDF"), Path::new("in"), Path::new("out"))
                .unwrap();
        assert_eq!(lower.base_name, "doc");
        assert_eq!(upper.base_name, "Doc");
        assert_eq!(upper.prefix, PathBuf::from("out/Doc"));
    }

    #[test]
    fn inner_dots_are_kept() {
        let t = ConversionTarget::derive(
            Path::new("in/v1.2 final.pdf"),
            Path::new("in"),
            Path::new("out"),
        )
        .unwrap();
        assert_eq!(t.base_name, "v1.2 final");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_stem_is_kept_in_prefix() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let source = Path::new("in").join(OsStr::from_bytes(b"r\xE9sum\xE9.pdf"));
        let t = ConversionTarget::derive(&source, Path::new("in"), Path::new("out")).unwrap();
        assert_eq!(
            t.prefix,
            Path::new("out").join(OsStr::from_bytes(b"r\xE9sum\xE9"))
        );
        assert_eq!(t.base_name, "r\u{FFFD}sum\u{FFFD}");
    }

    #[test]
    fn source_outside_root_is_an_error() {
        let err = ConversionTarget::derive(
            Path::new("/elsewhere/a.pdf"),
            Path::new("/in"),
            Path::new("/out"),
        )
        .unwrap_err();
        assert!(matches!(err, FileError::OutsideInputRoot { .. }));
    }
}
