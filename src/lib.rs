//! # mailprep
//!
//! Transcodes editor-authored HTML into markup that survives mail clients.
//!
//! Rich-text editors produce floats, legacy `font` elements, point and
//! relative sizes, percentage widths and inline image payloads. Mail
//! renderers ignore floats, hide very small text and need explicit pixel
//! dimensions. This library rewrites the former into the latter and wraps
//! the result in a complete document shell.
//!
//! ## Quick Start
//!
//! ```
//! let html = mailprep::transcode("<font size=\"1\">tiny</font>");
//! assert!(html.contains("font-size:10px"));
//! assert!(html.starts_with("<!DOCTYPE html"));
//! ```
//!
//! ## Features
//!
//! - **Typography**: white text, legacy font sizes, point units, relative
//!   line heights and a readable size floor
//! - **Layout**: floated images rebuilt as two-column tables
//! - **Images**: pixel widths and heights computed from embedded payloads
//! - **Never fails**: malformed input degrades instead of erroring
//! - **Parallel batches**: uses Rayon for many messages at once

pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod render;

// Re-export commonly used types
pub use convert::{is_html_path, ConvertOptions, ConvertResult, HtmlConverter, OutputFormat};
pub use detect::{detect_markup, is_transcoded, MarkupKind};
pub use error::{Error, Result};
pub use model::{Document, Element, ElementKind, NodeId, Style, StyleMap};
pub use parser::{parse_html, parse_html_with_options, ParseOptions};
pub use pipeline::{Stage, TranscodePipeline};
pub use render::{Preset, TranscodeOptions, TranscodeResult, TranscodeStats};

use rayon::prelude::*;

/// Transcode markup with default options.
///
/// # Example
///
/// ```
/// let html = mailprep::transcode("<p style=\"color:#fff\">Hi</p>");
/// assert!(html.contains("color:#000000"));
/// ```
pub fn transcode(html: &str) -> String {
    transcode_with_options(html, &TranscodeOptions::default())
}

/// Transcode markup with custom options.
///
/// # Example
///
/// ```
/// use mailprep::{transcode_with_options, TranscodeOptions};
///
/// let options = TranscodeOptions::default().with_template(false);
/// let html = transcode_with_options("<span style=\"font-size:6pt\">x</span>", &options);
/// assert_eq!(html, "<span style=\"font-size:10px\">x</span>");
/// ```
pub fn transcode_with_options(html: &str, options: &TranscodeOptions) -> String {
    transcode_with_stats(html, options).html
}

/// Transcode markup and report what changed.
pub fn transcode_with_stats(html: &str, options: &TranscodeOptions) -> TranscodeResult {
    TranscodePipeline::new(options.clone()).transcode(html)
}

/// Transcode many inputs in parallel.
///
/// Output order matches input order; every input gets its own tree.
///
/// # Example
///
/// ```
/// use mailprep::{transcode_batch, TranscodeOptions};
///
/// let inputs = ["<p>a</p>", "<p>b</p>"];
/// let outputs = transcode_batch(&inputs, &TranscodeOptions::default());
/// assert_eq!(outputs.len(), 2);
/// assert!(outputs[1].contains(">b</p>"));
/// ```
pub fn transcode_batch<S>(inputs: &[S], options: &TranscodeOptions) -> Vec<String>
where
    S: AsRef<str> + Sync,
{
    let pipeline = TranscodePipeline::new(options.clone());
    inputs
        .par_iter()
        .map(|html| pipeline.transcode(html.as_ref()).html)
        .collect()
}

/// Builder for configuring and running the transcoder.
///
/// # Example
///
/// ```
/// use mailprep::{Mailprep, Preset};
///
/// let html = Mailprep::new()
///     .with_preset(Preset::Strict)
///     .fragment_only()
///     .transcode("<span style=\"font-size:11px\">x</span>");
/// assert_eq!(html, "<span style=\"font-size:12px\">x</span>");
/// ```
#[derive(Debug, Clone)]
pub struct Mailprep {
    options: TranscodeOptions,
}

impl Mailprep {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            options: TranscodeOptions::default(),
        }
    }

    /// Start from a preset, keeping the current shell setting.
    pub fn with_preset(mut self, preset: Preset) -> Self {
        let wrap = self.options.wrap_template;
        self.options = TranscodeOptions::from_preset(preset).with_template(wrap);
        self
    }

    /// Replace all options.
    pub fn with_options(mut self, options: TranscodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the minimum font size in pixels.
    pub fn with_min_font_size(mut self, px: u32) -> Self {
        self.options.min_font_size_px = px;
        self
    }

    /// Set the width used for side-by-side images without one.
    pub fn with_fallback_image_width(mut self, px: u32) -> Self {
        self.options.fallback_image_width_px = px;
        self
    }

    /// Return only the transformed fragment, without the document shell.
    pub fn fragment_only(mut self) -> Self {
        self.options.wrap_template = false;
        self
    }

    /// Current options.
    pub fn options(&self) -> &TranscodeOptions {
        &self.options
    }

    /// Transcode markup.
    pub fn transcode(&self, html: &str) -> String {
        transcode_with_options(html, &self.options)
    }

    /// Transcode markup and report what changed.
    pub fn transcode_with_stats(&self, html: &str) -> TranscodeResult {
        transcode_with_stats(html, &self.options)
    }
}

impl Default for Mailprep {
    fn default() -> Self {
        Self::new()
    }
}
