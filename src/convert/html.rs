//! HTML document converter implementation.

use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::pipeline::TranscodePipeline;

use super::{is_html_path, ConvertOptions, ConvertResult, OutputFormat};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// HTML document converter.
///
/// Transcodes editor markup into mail-safe HTML, either as a complete
/// document, a bare fragment, or JSON with statistics. The stage pipeline
/// is built once and shared by every conversion, including parallel ones.
pub struct HtmlConverter {
    format: OutputFormat,
    pipeline: TranscodePipeline,
}

impl HtmlConverter {
    /// Create a converter; the output format decides whether the shell is added.
    pub fn new(options: ConvertOptions) -> Self {
        let mut transcode = options.transcode;
        match options.output_format {
            OutputFormat::Html => transcode.wrap_template = true,
            OutputFormat::Fragment => transcode.wrap_template = false,
            OutputFormat::Json => {}
        }
        Self {
            format: options.output_format,
            pipeline: TranscodePipeline::new(transcode),
        }
    }

    /// Output format of this converter.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Convert an `.html`, `.htm` or `.xhtml` file.
    pub fn convert_file(&self, path: &Path) -> Result<ConvertResult> {
        if !is_html_path(path) {
            return Err(Error::Other(format!(
                "Not an HTML file: {}",
                path.display()
            )));
        }
        let bytes = std::fs::read(path)?;
        self.convert_bytes(&bytes)
    }

    /// Convert many files in parallel; results follow input order.
    ///
    /// `on_done` is called from worker threads as each file finishes.
    pub fn convert_files<F>(&self, paths: &[PathBuf], on_done: F) -> Vec<Result<ConvertResult>>
    where
        F: Fn(&Path) + Sync,
    {
        paths
            .par_iter()
            .map(|path| {
                let result = self.convert_file(path);
                on_done(path);
                result
            })
            .collect()
    }

    /// Convert UTF-8 bytes, ignoring a leading byte order mark.
    pub fn convert_bytes(&self, bytes: &[u8]) -> Result<ConvertResult> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let html = String::from_utf8(bytes.to_vec())?;
        self.convert_str(&html)
    }

    /// Convert markup.
    pub fn convert_str(&self, html: &str) -> Result<ConvertResult> {
        let result = self.pipeline.transcode(html);
        let mime_type = self.format.mime_type();

        match self.format {
            OutputFormat::Html | OutputFormat::Fragment => {
                Ok(ConvertResult::new(result.html, result.stats).with_mime_type(mime_type))
            }
            OutputFormat::Json => {
                let content = serde_json::to_string_pretty(&result)
                    .map_err(|e| Error::Render(e.to_string()))?;
                Ok(ConvertResult::new(content, result.stats).with_mime_type(mime_type))
            }
        }
    }
}

impl Default for HtmlConverter {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}
