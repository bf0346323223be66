//! File conversion: read editor HTML from disk or bytes and produce
//! mail-ready output in one of several formats.
//!
//! # Example
//!
//! ```no_run
//! use mailprep::convert::{ConvertOptions, HtmlConverter};
//! use std::path::Path;
//!
//! fn main() -> mailprep::Result<()> {
//!     let converter = HtmlConverter::new(ConvertOptions::default());
//!     let result = converter.convert_file(Path::new("newsletter.html"))?;
//!     println!("{}", result.content);
//!     Ok(())
//! }
//! ```

mod html;

pub use html::HtmlConverter;

use crate::render::{TranscodeOptions, TranscodeStats};
use std::path::Path;

/// File extensions accepted as editor HTML.
pub const HTML_EXTENSIONS: &[&str] = &["html", "htm", "xhtml"];

/// Whether a path names an HTML file (case-insensitive extension check).
pub fn is_html_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| HTML_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Options for document conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Transcoding options
    pub transcode: TranscodeOptions,

    /// Output format
    pub output_format: OutputFormat,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set transcoding options.
    pub fn with_transcode_options(mut self, options: TranscodeOptions) -> Self {
        self.transcode = options;
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }
}

/// Output format for conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Complete document with the mail shell
    #[default]
    Html,

    /// Transformed fragment without the shell
    Fragment,

    /// JSON object with the markup and statistics
    Json,
}

impl OutputFormat {
    /// MIME type of output in this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Html | OutputFormat::Fragment => "text/html",
            OutputFormat::Json => "application/json",
        }
    }

    /// File extension for output written in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Html | OutputFormat::Fragment => "html",
            OutputFormat::Json => "json",
        }
    }
}

/// Result of document conversion.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// Converted content
    pub content: String,

    /// Transcoding statistics
    pub stats: TranscodeStats,

    /// MIME type of the output
    pub mime_type: &'static str,
}

impl ConvertResult {
    /// Create a new conversion result.
    pub fn new(content: String, stats: TranscodeStats) -> Self {
        Self {
            content,
            stats,
            mime_type: "text/html",
        }
    }

    /// Set MIME type.
    pub fn with_mime_type(mut self, mime_type: &'static str) -> Self {
        self.mime_type = mime_type;
        self
    }

    /// Get content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}
