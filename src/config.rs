//! Configuration for a batch run.
//!
//! Every knob lives in [`BatchConfig`], built via [`BatchConfigBuilder`]. The
//! defaults reproduce the fixed setup the tool started from: `pdftoppm` at
//! 400 DPI, reading `../data/pdf_file` and writing `../data/pdf_img`, with
//! already-converted documents skipped.

use crate::error::BatchError;
use crate::pipeline::template::CommandTemplate;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_INPUT_ROOT: &str = "../data/pdf_file";
pub const DEFAULT_OUTPUT_ROOT: &str = "../data/pdf_img";
pub const DEFAULT_DPI: u32 = 400;
pub const MIN_DPI: u32 = 36;
pub const MAX_DPI: u32 = 1200;
pub const DEFAULT_SOURCE_EXTENSION: &str = "pdf";
pub const DEFAULT_IMAGE_EXTENSION: &str = "png";

/// Configuration for one pass over a document tree.
///
/// Built via [`BatchConfig::builder()`] or [`BatchConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2png::BatchConfig;
///
/// let config = BatchConfig::builder()
///     .input_root("scans/pdf")
///     .output_root("scans/png")
///     .dpi(300)
///     .command_template("pdftoppm -png -rx {dpi} -ry {dpi} {input} {output}")
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 300);
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// Directory tree scanned for source documents.
    pub input_root: PathBuf,

    /// Directory tree mirroring `input_root`; receives the images.
    pub output_root: PathBuf,

    /// Resolution passed to the renderer for both axes. Range: 36–1200. Default: 400.
    pub dpi: u32,

    /// Renderer command line with `{dpi}`, `{input}` and `{output}` placeholders.
    pub command_template: CommandTemplate,

    /// Extension (without dot, any case) identifying source documents. Default: `pdf`.
    pub source_extension: String,

    /// Extension (without dot, any case) of the renderer's images. Default: `png`.
    ///
    /// Only used to decide whether a document was already converted; the
    /// renderer's own output format is chosen by the template.
    pub image_extension: String,

    /// Skip documents whose images already exist. Default: true.
    ///
    /// Turning this off re-renders every document on every run.
    pub skip_existing: bool,

    /// Report what would be converted without running the renderer. Default: false.
    pub dry_run: bool,

    /// Kill the renderer after this many seconds. Default: None (wait forever).
    pub command_timeout_secs: Option<u64>,

    /// Per-file progress events. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_root: PathBuf::from(DEFAULT_INPUT_ROOT),
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            dpi: DEFAULT_DPI,
            command_template: CommandTemplate::default(),
            source_extension: DEFAULT_SOURCE_EXTENSION.to_string(),
            image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
            skip_existing: true,
            dry_run: false,
            command_timeout_secs: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("input_root", &self.input_root)
            .field("output_root", &self.output_root)
            .field("dpi", &self.dpi)
            .field("command_template", &self.command_template)
            .field("source_extension", &self.source_extension)
            .field("image_extension", &self.image_extension)
            .field("skip_existing", &self.skip_existing)
            .field("dry_run", &self.dry_run)
            .field("command_timeout_secs", &self.command_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
            template: None,
        }
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
    template: Option<String>,
}

impl BatchConfigBuilder {
    pub fn input_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.input_root = path.into();
        self
    }

    pub fn output_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_root = path.into();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(MIN_DPI, MAX_DPI);
        self
    }

    /// Set the renderer command line; parsed and validated in [`Self::build`].
    pub fn command_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn source_extension(mut self, ext: impl Into<String>) -> Self {
        self.config.source_extension = normalise_extension(ext.into());
        self
    }

    pub fn image_extension(mut self, ext: impl Into<String>) -> Self {
        self.config.image_extension = normalise_extension(ext.into());
        self
    }

    pub fn skip_existing(mut self, v: bool) -> Self {
        self.config.skip_existing = v;
        self
    }

    pub fn dry_run(mut self, v: bool) -> Self {
        self.config.dry_run = v;
        self
    }

    pub fn command_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.config.command_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<BatchConfig, BatchError> {
        if let Some(template) = self.template.take() {
            self.config.command_template = CommandTemplate::parse(template)?;
        }

        let c = &self.config;
        if c.dpi < MIN_DPI || c.dpi > MAX_DPI {
            return Err(BatchError::InvalidConfig(format!(
                "DPI must be {MIN_DPI}–{MAX_DPI}, got {}",
                c.dpi
            )));
        }
        if c.source_extension.is_empty() {
            return Err(BatchError::InvalidConfig(
                "source extension must not be empty".into(),
            ));
        }
        if c.image_extension.is_empty() {
            return Err(BatchError::InvalidConfig(
                "image extension must not be empty".into(),
            ));
        }
        if c.command_timeout_secs == Some(0) {
            return Err(BatchError::InvalidConfig(
                "command timeout must be at least 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Accept `".pdf"` as well as `"pdf"`.
fn normalise_extension(ext: String) -> String {
    ext.trim().trim_start_matches('.').to_string()
}
