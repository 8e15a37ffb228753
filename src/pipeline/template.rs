//! Command templates: placeholder substitution and argv splitting.
//!
//! A template is a single command line with three placeholders:
//!
//! | Placeholder | Replaced with |
//! |-------------|---------------|
//! | `{dpi}`     | the configured resolution (any number of occurrences) |
//! | `{input}`   | the source document path, verbatim |
//! | `{output}`  | the conversion target prefix, verbatim |
//!
//! The template is split into words once, when it is parsed, and each word is
//! kept as a list of literal and placeholder pieces. Building the argv for a
//! document only concatenates pieces, so every occurrence of every placeholder
//! is replaced, text coming from a substituted path is never rescanned, and
//! paths reach the renderer as raw [`OsString`]s (file names that are not
//! UTF-8 included). The program is spawned directly, without a shell.
//!
//! [`CommandTemplate::render`] produces the equivalent quoted command line
//! for logs only.
//!
//! ## Quoting rules
//!
//! * whitespace outside quotes separates words;
//! * `"…"` groups a word; inside it `\"` and `\\` are escapes, any other
//!   backslash is literal;
//! * `'…'` groups a word literally;
//! * a backslash outside quotes is literal, so `C:\tools\pdftoppm.exe` works.

use crate::error::BatchError;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::path::Path;

/// Template used when none is configured: Poppler's `pdftoppm`.
pub const DEFAULT_COMMAND_TEMPLATE: &str = "pdftoppm -png -rx {dpi} -ry {dpi} {input} {output}";

pub const DPI_PLACEHOLDER: &str = "dpi";
pub const INPUT_PLACEHOLDER: &str = "input";
pub const OUTPUT_PLACEHOLDER: &str = "output";

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// Values substituted into a [`CommandTemplate`] for one document.
#[derive(Debug, Clone, Copy)]
pub struct TemplateValues<'a> {
    pub dpi: u32,
    pub input: &'a Path,
    pub output: &'a Path,
}

/// A validated command template.
///
/// Construct with [`CommandTemplate::parse`]; parsing rejects empty templates,
/// unknown placeholders, unbalanced quotes, and templates that do not mention
/// both `{input}` and `{output}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommandTemplate {
    source: String,
    words: Vec<Vec<Piece>>,
}

/// One fragment of a template word.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Dpi,
    Input,
    Output,
}

/// Break one split word into literal and placeholder pieces.
fn parse_word(word: &str) -> Result<Vec<Piece>, BatchError> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for caps in PLACEHOLDER_RE.captures_iter(word) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        if whole.start > last {
            pieces.push(Piece::Literal(word[last..whole.start].to_string()));
        }
        pieces.push(match &caps[1] {
            DPI_PLACEHOLDER => Piece::Dpi,
            INPUT_PLACEHOLDER => Piece::Input,
            OUTPUT_PLACEHOLDER => Piece::Output,
            other => {
                return Err(BatchError::InvalidTemplate(format!(
                    "unknown placeholder '{{{other}}}' (expected {{dpi}}, {{input}} or {{output}})"
                )))
            }
        });
        last = whole.end;
    }
    if last < word.len() || pieces.is_empty() {
        pieces.push(Piece::Literal(word[last..].to_string()));
    }
    Ok(pieces)
}

impl CommandTemplate {
    pub fn parse(template: impl Into<String>) -> Result<Self, BatchError> {
        let source: String = template.into();

        let words = split_command_line(&source)?;
        if words.is_empty() {
            return Err(BatchError::InvalidTemplate("template is empty".into()));
        }

        let words = words
            .iter()
            .map(|w| parse_word(w))
            .collect::<Result<Vec<_>, _>>()?;

        let mentions = |p: &Piece| words.iter().flatten().any(|q| q == p);
        if !mentions(&Piece::Input) {
            return Err(BatchError::InvalidTemplate(
                "template must contain {input}".into(),
            ));
        }
        if !mentions(&Piece::Output) {
            return Err(BatchError::InvalidTemplate(
                "template must contain {output}".into(),
            ));
        }
        if words[0].iter().any(|p| !matches!(p, Piece::Literal(_))) {
            return Err(BatchError::InvalidTemplate(
                "the program name cannot be a placeholder".into(),
            ));
        }

        Ok(Self { source, words })
    }

    /// The template text as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The program the template invokes (its first word).
    pub fn program(&self) -> String {
        self.words
            .first()
            .map(|word| {
                word.iter()
                    .filter_map(|p| match p {
                        Piece::Literal(text) => Some(text.as_str()),
                        _ => None,
                    })
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    /// Render the full command line for one document, for display.
    ///
    /// Paths are double-quoted (lossily, if they are not UTF-8). Use
    /// [`CommandTemplate::to_argv`] to obtain what is actually executed.
    pub fn render(&self, values: &TemplateValues<'_>) -> String {
        PLACEHOLDER_RE
            .replace_all(&self.source, |caps: &Captures<'_>| match &caps[1] {
                DPI_PLACEHOLDER => values.dpi.to_string(),
                INPUT_PLACEHOLDER => quote_path(values.input),
                OUTPUT_PLACEHOLDER => quote_path(values.output),
                // parse() rejects every other name
                _ => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Build the argv for one document, program first.
    pub fn to_argv(&self, values: &TemplateValues<'_>) -> Vec<OsString> {
        self.words
            .iter()
            .map(|word| {
                let mut arg = OsString::new();
                for piece in word {
                    match piece {
                        Piece::Literal(text) => arg.push(text),
                        Piece::Dpi => arg.push(values.dpi.to_string()),
                        Piece::Input => arg.push(values.input),
                        Piece::Output => arg.push(values.output),
                    }
                }
                arg
            })
            .collect()
    }
}

impl Default for CommandTemplate {
    fn default() -> Self {
        let words = ["pdftoppm", "-png", "-rx", "{dpi}", "-ry", "{dpi}", "{input}", "{output}"];
        Self {
            source: DEFAULT_COMMAND_TEMPLATE.to_string(),
            words: words
                .iter()
                .map(|w| match *w {
                    "{dpi}" => vec![Piece::Dpi],
                    "{input}" => vec![Piece::Input],
                    "{output}" => vec![Piece::Output],
                    literal => vec![Piece::Literal(literal.to_string())],
                })
                .collect(),
        }
    }
}

impl fmt::Debug for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CommandTemplate").field(&self.source).finish()
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl TryFrom<String> for CommandTemplate {
    type Error = BatchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CommandTemplate> for String {
    fn from(t: CommandTemplate) -> Self {
        t.source
    }
}

/// Wrap a path in double quotes, escaping `\` and `"`.
pub fn quote_path(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let mut quoted = String::with_capacity(raw.len() + 2);
    quoted.push('"');
    for ch in raw.chars() {
        if ch == '"' || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

/// Split a command line into words following the module's quoting rules.
pub fn split_command_line(line: &str) -> Result<Vec<String>, BatchError> {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Plain,
        Double,
        Single,
    }

    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut state = State::Plain;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match state {
            State::Plain => match ch {
                c if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                '"' => {
                    state = State::Double;
                    in_word = true;
                }
                '\'' => {
                    state = State::Single;
                    in_word = true;
                }
                c => {
                    current.push(c);
                    in_word = true;
                }
            },
            State::Double => match ch {
                '"' => state = State::Plain,
                '\\' => match chars.peek() {
                    Some(&next @ ('"' | '\\')) => {
                        current.push(next);
                        chars.next();
                    }
                    _ => current.push('\\'),
                },
                c => current.push(c),
            },
            State::Single => match ch {
                '\'' => state = State::Plain,
                c => current.push(c),
            },
        }
    }

    match state {
        State::Plain => {}
        State::Double => {
            return Err(BatchError::InvalidTemplate(format!(
                "unterminated double quote in: {line}"
            )))
        }
        State::Single => {
            return Err(BatchError::InvalidTemplate(format!(
                "unterminated single quote in: {line}"
            )))
        }
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
