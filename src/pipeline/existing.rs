//! Skip detection: has this document already been rasterised?
//!
//! The renderer names its images after the target prefix plus a page suffix
//! whose width depends on the page count, so the check is a prefix match over
//! the target directory rather than a lookup of one exact file name. Any I/O
//! failure reads as "not converted yet": a redundant re-conversion is
//! preferable to silently skipping a document.

use crate::pipeline::discover::has_extension;
use crate::pipeline::target::ConversionTarget;
use std::fs;
use std::path::Path;
use tracing::debug;

/// True when `target.directory` holds an entry whose name starts with the
/// final component of `target.prefix` and whose extension is `image_extension`
/// (case-insensitive).
pub fn has_existing_output(target: &ConversionTarget, image_extension: &str) -> bool {
    let entries = match fs::read_dir(&target.directory) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(
                "Output directory {} not readable ({}); treating as not converted",
                target.directory.display(),
                e
            );
            return false;
        }
    };

    let Some(stem) = target.prefix.file_name() else {
        return false;
    };

    entries.filter_map(Result::ok).any(|entry| {
        let name = entry.file_name();
        name.as_encoded_bytes().starts_with(stem.as_encoded_bytes())
            && has_extension(Path::new(&name), image_extension)
    })
}

/// Derive the target for `source` and check it. A source that has no target
/// (outside the input root) is reported as not converted.
pub fn is_already_converted(
    source: &Path,
    input_root: &Path,
    output_root: &Path,
    image_extension: &str,
) -> bool {
    match ConversionTarget::derive(source, input_root, output_root) {
        Ok(target) => has_existing_output(&target, image_extension),
        Err(e) => {
            debug!("{}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Roots {
        _dir: TempDir,
        input: std::path::PathBuf,
        output: std::path::PathBuf,
    }

    fn roots() -> Roots {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        fs::create_dir_all(input.join("sub")).unwrap();
        Roots {
            _dir: dir,
            input,
            output,
        }
    }

    #[test]
    fn missing_output_directory_means_not_converted() {
        let r = roots();
        let src = r.input.join("sub/report.pdf");
        assert!(!is_already_converted(&src, &r.input, &r.output, "png"));
    }

    #[test]
    fn numbered_page_image_counts_as_converted() {
        let r = roots();
        fs::create_dir_all(r.output.join("sub")).unwrap();
        fs::write(r.output.join("sub/report-01.png"), b"").unwrap();

        let src = r.input.join("sub/report.pdf");
        assert!(is_already_converted(&src, &r.input, &r.output, "png"));
    }

    #[test]
    fn image_extension_match_ignores_case() {
        let r = roots();
        fs::create_dir_all(&r.output).unwrap();
        fs::write(r.output.join("Scan-1.PNG"), b"").unwrap();

        let src = r.input.join("Scan.pdf");
        assert!(is_already_converted(&src, &r.input, &r.output, "png"));
    }

    #[test]
    fn other_extensions_and_other_stems_do_not_count() {
        let r = roots();
        fs::create_dir_all(&r.output).unwrap();
        fs::write(r.output.join("report-1.ppm"), b"").unwrap();
        fs::write(r.output.join("summary-1.png"), b"").unwrap();

        let src = r.input.join("report.pdf");
        assert!(!is_already_converted(&src, &r.input, &r.output, "png"));
    }

    #[test]
    fn images_in_a_sibling_directory_do_not_count() {
        let r = roots();
        fs::create_dir_all(r.output.join("other")).unwrap();
        fs::write(r.output.join("other/report-1.png"), b"").unwrap();

        let src = r.input.join("sub/report.pdf");
        assert!(!is_already_converted(&src, &r.input, &r.output, "png"));
    }

    #[test]
    fn output_path_that_is_a_file_means_not_converted() {
        let r = roots();
        fs::create_dir_all(&r.output).unwrap();
        fs::write(r.output.join("sub"), b"not a directory").unwrap();

        let src = r.input.join("sub/report.pdf");
        assert!(!is_already_converted(&src, &r.input, &r.output, "png"));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_stems_compare_by_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let r = roots();
        fs::create_dir_all(&r.output).unwrap();
        fs::write(r.output.join(OsStr::from_bytes(b"r\xE8sum\xE8-1.png")), b"").unwrap();

        let src = r.input.join(OsStr::from_bytes(b"r\xE9sum\xE9.pdf"));
        assert!(!is_already_converted(&src, &r.input, &r.output, "png"));

        fs::write(r.output.join(OsStr::from_bytes(b"r\xE9sum\xE9-1.png")), b"").unwrap();
        assert!(is_already_converted(&src, &r.input, &r.output, "png"));
    }

    #[test]
    fn source_outside_root_means_not_converted() {
        let r = roots();
        assert!(!is_already_converted(
            Path::new("/somewhere/else.pdf"),
            &r.input,
            &r.output,
            "png"
        ));
    }
}
