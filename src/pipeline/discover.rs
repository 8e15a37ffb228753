//! Discovery: collect every source document under the input root.
//!
//! Traversal follows symlinks and sorts entries by file name, so the run order
//! is stable between invocations. An unreadable subdirectory (or a symlink
//! loop) is logged and its subtree skipped; only a missing or unreadable root
//! is fatal.

use crate::error::BatchError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Whether `path` has the extension `ext`, ignoring ASCII case.
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Recursively collect files under `root` whose extension is `extension`
/// (case-insensitive), in walk order.
pub fn discover_sources(root: &Path, extension: &str) -> Result<Vec<PathBuf>, BatchError> {
    if !root.is_dir() {
        return Err(BatchError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut found = Vec::new();

    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(BatchError::DirectoryUnreadable {
                    path: root.to_path_buf(),
                    detail: err.to_string(),
                });
            }
            Err(err) => {
                let at = err
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                warn!("Skipping unreadable entry {}: {}", at, err);
                continue;
            }
        };

        if entry.file_type().is_file() && has_extension(entry.path(), extension) {
            debug!("Found source: {}", entry.path().display());
            found.push(entry.into_path());
        }
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"%PDF-1.4\n").unwrap();
    }

    #[test]
    fn has_extension_ignores_case() {
        assert!(has_extension(Path::new("a/Doc.PDF"), "pdf"));
        assert!(has_extension(Path::new("a/doc.pdf"), "PDF"));
        assert!(!has_extension(Path::new("a/doc.pdf.txt"), "pdf"));
        assert!(!has_extension(Path::new("a/pdf"), "pdf"));
    }

    #[test]
    fn finds_nested_files_case_insensitively() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("a.pdf"));
        touch(&root.join("sub/Doc.PDF"));
        touch(&root.join("sub/deeper/c.Pdf"));
        touch(&root.join("sub/notes.txt"));
        touch(&root.join("readme.md"));

        let found = discover_sources(root, "pdf").unwrap();
        let rel: Vec<PathBuf> = found
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            rel,
            vec![
                PathBuf::from("a.pdf"),
                PathBuf::from("sub/Doc.PDF"),
                PathBuf::from("sub/deeper/c.Pdf"),
            ]
        );
    }

    #[test]
    fn directory_named_like_a_pdf_is_not_a_source() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("folder.pdf")).unwrap();
        touch(&dir.path().join("folder.pdf/inner.pdf"));

        let found = discover_sources(dir.path(), "pdf").unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("folder.pdf/inner.pdf"));
    }

    #[test]
    fn empty_tree_yields_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(discover_sources(dir.path(), "pdf").unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlink_loop_is_skipped_and_siblings_still_found() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("a.pdf"));
        touch(&root.join("sub/b.pdf"));
        std::os::unix::fs::symlink(root, root.join("sub/loop")).unwrap();

        let found = discover_sources(root, "pdf").unwrap();
        let rel: Vec<PathBuf> = found
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(rel, vec![PathBuf::from("a.pdf"), PathBuf::from("sub/b.pdf")]);
    }

    #[test]
    fn missing_root_is_directory_not_found() {
        let dir = TempDir::new().unwrap();
        let err = discover_sources(&dir.path().join("nope"), "pdf").unwrap_err();
        assert!(matches!(err, BatchError::DirectoryNotFound { .. }));
    }

    #[test]
    fn file_root_is_directory_not_found() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("single.pdf");
        touch(&file);
        let err = discover_sources(&file, "pdf").unwrap_err();
        assert!(matches!(err, BatchError::DirectoryNotFound { .. }));
    }
}
