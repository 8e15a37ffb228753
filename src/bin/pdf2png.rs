//! CLI binary for pdf2png.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `BatchConfig` and prints the run summary.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2png::{
    convert_tree, BatchConfig, BatchProgressCallback, FileError, ProgressCallback, RunSummary,
    DEFAULT_COMMAND_TEMPLATE,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over the discovered documents plus a
/// log line per finished document.
struct CliProgressCallback {
    bar: ProgressBar,
    input_root: PathBuf,
}

impl CliProgressCallback {
    /// The bar starts as a spinner; `on_run_start` gives it a length once
    /// discovery has finished.
    fn new_dynamic(input_root: PathBuf) -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.set_message("Looking for PDF files…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar, input_root })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }

    /// Show paths relative to the input root; they are shorter and still unique.
    fn short(&self, source: &Path) -> String {
        source
            .strip_prefix(&self.input_root)
            .unwrap_or(source)
            .display()
            .to_string()
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total: usize) {
        self.activate_bar(total);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Found {total} PDF files"))
        ));
    }

    fn on_file_start(&self, source: &Path, _index: usize, _total: usize) {
        self.bar.set_message(self.short(source));
    }

    fn on_file_skipped(&self, source: &Path, _index: usize, _total: usize) {
        self.bar.println(format!(
            "  {} {}  {}",
            dim("↷"),
            self.short(source),
            dim("already converted")
        ));
        self.bar.inc(1);
    }

    fn on_file_planned(&self, source: &Path, _index: usize, _total: usize) {
        self.bar.println(format!(
            "  {} {}  {}",
            cyan("•"),
            self.short(source),
            dim("would convert")
        ));
        self.bar.inc(1);
    }

    fn on_file_converted(&self, source: &Path, _index: usize, _total: usize, duration_ms: u64) {
        self.bar.println(format!(
            "  {} {}  {}",
            green("✓"),
            self.short(source),
            dim(&format!("{:.1}s", duration_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_file_failed(&self, source: &Path, _index: usize, _total: usize, error: &FileError) {
        let msg = error.to_string();
        let first_line = msg.lines().next().unwrap_or_default();
        let msg = if first_line.chars().count() > 100 {
            let cut: String = first_line.chars().take(99).collect();
            format!("{cut}\u{2026}")
        } else {
            first_line.to_string()
        };

        self.bar.println(format!(
            "  {} {}  {}",
            red("✗"),
            self.short(source),
            red(&msg)
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, _summary: &RunSummary) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert ../data/pdf_file into ../data/pdf_img at 400 DPI
  pdf2png

  # Explicit directories and resolution
  pdf2png scans/pdf -o scans/png --dpi 300

  # See what would be converted, touch nothing
  pdf2png scans/pdf -o scans/png --dry-run

  # Re-render everything, ignoring existing images
  pdf2png scans/pdf -o scans/png --force

  # Use MuPDF instead of Poppler
  pdf2png scans/pdf -o scans/png --command 'mutool draw -r {dpi} -o {output}-%d.png {input}'

  # Machine-readable summary
  pdf2png --json --no-progress > summary.json

COMMAND TEMPLATE:
  Placeholders:  {dpi}     resolution, substituted everywhere it appears
                 {input}   source PDF path (quoted)
                 {output}  output prefix: mirrored path without extension (quoted)
  Default:       pdftoppm -png -rx {dpi} -ry {dpi} {input} {output}
  The command is split into arguments with shell-like quoting ("…" and '…')
  and run directly, without a shell.

SKIPPING:
  A PDF counts as converted when its mirrored output directory contains a
  file whose name starts with the PDF's stem and ends in --image-ext (png).
  Re-running after an interruption therefore resumes where it stopped.

EXIT STATUS:
  0 when the run completes, even if some files failed (see the summary).
  Non-zero only when the run cannot start (missing input directory,
  unwritable output directory, invalid flags or template).
"#;

/// Convert every PDF under a directory tree into PNG page images.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2png",
    version,
    about = "Convert every PDF under a directory tree into PNG page images",
    long_about = "Walks the input directory for PDF files and renders each page to PNG with an \
external tool (pdftoppm by default), mirroring the directory structure under the output \
directory. Documents that already have images are skipped, so re-runs resume.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory scanned (recursively) for PDF files.
    #[arg(env = "PDF2PNG_INPUT", default_value = pdf2png::config::DEFAULT_INPUT_ROOT)]
    input: PathBuf,

    /// Directory receiving the images; mirrors the input tree.
    #[arg(short, long, env = "PDF2PNG_OUTPUT", default_value = pdf2png::config::DEFAULT_OUTPUT_ROOT)]
    output: PathBuf,

    /// Rendering resolution in DPI, applied to both axes (36–1200).
    #[arg(long, env = "PDF2PNG_DPI", default_value_t = pdf2png::config::DEFAULT_DPI,
          value_parser = clap::value_parser!(u32).range(36..=1200))]
    dpi: u32,

    /// Renderer command template with {dpi}, {input} and {output} placeholders.
    #[arg(long, env = "PDF2PNG_COMMAND", default_value = DEFAULT_COMMAND_TEMPLATE)]
    command: String,

    /// Extension of source documents (case-insensitive).
    #[arg(long, env = "PDF2PNG_SOURCE_EXT", default_value = pdf2png::config::DEFAULT_SOURCE_EXTENSION)]
    source_ext: String,

    /// Extension of produced images, used to detect finished documents.
    #[arg(long, env = "PDF2PNG_IMAGE_EXT", default_value = pdf2png::config::DEFAULT_IMAGE_EXTENSION)]
    image_ext: String,

    /// Convert every document, even if images already exist.
    #[arg(long, env = "PDF2PNG_FORCE")]
    force: bool,

    /// List what would be converted without running the renderer.
    #[arg(long, env = "PDF2PNG_DRY_RUN")]
    dry_run: bool,

    /// Kill the renderer after this many seconds (default: wait forever).
    #[arg(long, env = "PDF2PNG_TIMEOUT", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Print the run summary as JSON on stdout.
    #[arg(long, env = "PDF2PNG_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2PNG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2PNG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2PNG_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces the per-file INFO lines when it is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.verbose;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic(cli.input.clone());
        Some(cb as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run ──────────────────────────────────────────────────────────────
    let summary = convert_tree(&config)
        .await
        .with_context(|| format!("Batch conversion of {:?} failed", cli.input))?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        print_summary(&summary, cli.dry_run);
    }

    Ok(())
}

/// Map CLI args to `BatchConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<BatchConfig> {
    let mut builder = BatchConfig::builder()
        .input_root(&cli.input)
        .output_root(&cli.output)
        .dpi(cli.dpi)
        .command_template(&cli.command)
        .source_extension(&cli.source_ext)
        .image_extension(&cli.image_ext)
        .skip_existing(!cli.force)
        .dry_run(cli.dry_run)
        .command_timeout_secs(cli.timeout);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(summary: &RunSummary, dry_run: bool) {
    if summary.discovered == 0 {
        eprintln!("{} no PDF files found", cyan("⚠"));
        return;
    }

    let mark = if summary.failed == 0 {
        green("✔")
    } else if summary.converted == 0 && summary.skipped == 0 {
        red("✘")
    } else {
        cyan("⚠")
    };

    if dry_run {
        eprintln!(
            "{} {} to convert, {} already converted  {}",
            mark,
            bold(&summary.planned.to_string()),
            summary.skipped,
            dim("(dry run)"),
        );
    } else {
        eprintln!(
            "{} {} converted, {} skipped, {} failed  {}",
            mark,
            bold(&summary.converted.to_string()),
            summary.skipped,
            if summary.failed > 0 {
                red(&summary.failed.to_string())
            } else {
                summary.failed.to_string()
            },
            dim(&format!("{}ms", summary.total_duration_ms)),
        );
    }

    for failure in &summary.failures {
        eprintln!("   {} {}", red("✗"), failure.source.display());
        if let FileError::CommandFailed { ref stderr, .. } = failure.error {
            for line in stderr.lines().take(5) {
                eprintln!("     {}", dim(line));
            }
        } else {
            eprintln!("     {}", dim(&failure.error.to_string()));
        }
    }
}
