//! Transcoding pipeline.
//!
//! Stages run in a fixed order over one [`Document`]; each later stage may
//! rely on the properties earlier stages normalized:
//!
//! 1. text colors
//! 2. legacy `font` elements
//! 3. font-size units
//! 4. line heights (from the pre-floor font size)
//! 5. minimum font size
//! 6. side-by-side layout tables
//! 7. residual images
//! 8. block defaults
//!
//! The document shell is added after serialization (see
//! [`crate::render::wrap_document`]).
//!
//! # Example
//!
//! ```
//! use mailprep::pipeline::TranscodePipeline;
//! use mailprep::render::TranscodeOptions;
//!
//! let options = TranscodeOptions::default().with_template(false);
//! let pipeline = TranscodePipeline::new(options);
//! let result = pipeline.transcode("<font size=\"1\">tiny</font>");
//! assert!(result.html.contains("font-size:10px"));
//! ```

mod block_defaults;
mod color;
mod font_size;
mod font_tag;
mod image;
mod layout;
mod line_height;
mod min_size;

pub use block_defaults::BlockDefaultInliner;
pub use color::{is_light_color, TextColorNormalizer};
pub use font_size::{normalize_font_size, FontSizeNormalizer};
pub use font_tag::{legacy_size_to_px, FontTagRewriter};
pub use image::ImageNormalizer;
pub use layout::{in_layout_table, LayoutTableBuilder, LAYOUT_MARKER_ATTR, LAYOUT_MARKER_VALUE};
pub use line_height::LineHeightNormalizer;
pub use min_size::MinimumSizeEnforcer;

use crate::model::Document;
use crate::parser::parse_html_with_options;
use crate::render::{
    serialize_children, wrap_document, Preset, TranscodeOptions, TranscodeResult, TranscodeStats,
};

/// A single in-place transform over the document tree.
///
/// Stages hold no state between calls, so one pipeline can serve many
/// threads.
pub trait Stage: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Transform the document.
    fn apply(&self, doc: &mut Document, options: &TranscodeOptions, stats: &mut TranscodeStats);
}

/// The ordered set of stages enabled by a [`TranscodeOptions`].
pub struct TranscodePipeline {
    options: TranscodeOptions,
    stages: Vec<Box<dyn Stage>>,
}

impl TranscodePipeline {
    /// Create a pipeline with the given options.
    pub fn new(options: TranscodeOptions) -> Self {
        let mut stages: Vec<Box<dyn Stage>> = Vec::new();

        if options.normalize_colors {
            stages.push(Box::new(TextColorNormalizer));
        }
        if options.rewrite_font_tags {
            stages.push(Box::new(FontTagRewriter));
        }
        if options.normalize_font_units {
            stages.push(Box::new(FontSizeNormalizer));
        }
        if options.normalize_line_height {
            stages.push(Box::new(LineHeightNormalizer));
        }
        if options.enforce_min_font_size {
            stages.push(Box::new(MinimumSizeEnforcer));
        }
        if options.build_layout_tables {
            stages.push(Box::new(LayoutTableBuilder));
        }
        if options.normalize_images {
            stages.push(Box::new(ImageNormalizer));
        }
        if options.inline_block_defaults {
            stages.push(Box::new(BlockDefaultInliner));
        }

        Self { options, stages }
    }

    /// Create a pipeline from a preset.
    pub fn from_preset(preset: Preset) -> Self {
        Self::new(TranscodeOptions::from_preset(preset))
    }

    /// Options this pipeline was built with.
    pub fn options(&self) -> &TranscodeOptions {
        &self.options
    }

    /// Names of the enabled stages, in run order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every enabled stage over a parsed document.
    pub fn run(&self, doc: &mut Document) -> TranscodeStats {
        let mut stats = TranscodeStats::new();

        for id in doc.elements() {
            stats.element_count += 1;
            if doc.element(id).is_some_and(|el| el.style.is_unparsable()) {
                stats.unparsable_styles += 1;
            }
        }

        for stage in &self.stages {
            let before = stats.total_changes();
            stage.apply(doc, &self.options, &mut stats);
            log::debug!(
                "Stage {} made {} changes",
                stage.name(),
                stats.total_changes() - before
            );
        }

        stats
    }

    /// Parse, transform and serialize markup.
    ///
    /// Never fails: markup that cannot be parsed yields an empty result
    /// (still wrapped in the shell when enabled) with
    /// [`TranscodeStats::parse_failed`] set.
    pub fn transcode(&self, html: &str) -> TranscodeResult {
        let (mut doc, parse_failed) = match parse_html_with_options(html, &self.options.parse) {
            Ok(doc) => (doc, false),
            Err(e) => {
                log::warn!("Producing empty output for unparsable input: {}", e);
                (Document::new(), true)
            }
        };

        let mut stats = self.run(&mut doc);
        stats.parse_failed = parse_failed;

        let fragment = serialize_children(&doc, doc.root());
        let html = if self.options.wrap_template {
            wrap_document(&fragment, &self.options)
        } else {
            fragment
        };

        TranscodeResult::new(html, stats)
    }
}

impl Default for TranscodePipeline {
    fn default() -> Self {
        Self::new(TranscodeOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParseOptions;

    fn fragment(options: TranscodeOptions) -> TranscodePipeline {
        TranscodePipeline::new(options.with_template(false))
    }

    #[test]
    fn test_stage_order() {
        let pipeline = TranscodePipeline::default();
        assert_eq!(
            pipeline.stage_names(),
            vec![
                "text-color",
                "font-tag",
                "font-size",
                "line-height",
                "min-font-size",
                "layout",
                "image",
                "block-defaults",
            ]
        );
    }

    #[test]
    fn test_minimal_preset_stages() {
        let pipeline = TranscodePipeline::from_preset(Preset::Minimal);
        assert_eq!(
            pipeline.stage_names(),
            vec!["text-color", "font-tag", "font-size", "line-height", "min-font-size"]
        );
    }

    #[test]
    fn test_line_height_uses_pre_floor_size() {
        let result = fragment(TranscodeOptions::minimal())
            .transcode("<span style=\"font-size:8px;line-height:1.5\">x</span>");
        assert_eq!(
            result.html,
            "<span style=\"font-size:10px;line-height:12px;mso-line-height-rule:exactly\">x</span>"
        );
        assert_eq!(result.stats.font_sizes_raised, 1);
    }

    #[test]
    fn test_font_tag_then_units_then_floor() {
        let result = fragment(TranscodeOptions::strict())
            .transcode("<font size=\"1\" color=\"#ffffff\">tiny</font>");
        assert_eq!(
            result.html,
            "<span style=\"font-size:12px;color:#000000\">tiny</span>"
        );
        assert_eq!(result.stats.colors_rewritten, 1);
        assert_eq!(result.stats.font_tags_rewritten, 1);
        assert_eq!(result.stats.font_sizes_raised, 1);
    }

    #[test]
    fn test_counts_unparsable_styles() {
        let result = fragment(TranscodeOptions::default())
            .transcode("<p style=\"color white\">x</p><p>y</p>");
        assert_eq!(result.stats.element_count, 2);
        assert_eq!(result.stats.unparsable_styles, 1);
        assert!(result.html.contains("<p style=\"color white\">x</p>"));
    }

    #[test]
    fn test_parse_failure_yields_empty_shell() {
        let options = TranscodeOptions::default()
            .with_parse_options(ParseOptions::default().with_max_input_bytes(4));
        let result = TranscodePipeline::new(options).transcode("<p>too long</p>");
        assert!(result.stats.parse_failed);
        assert!(result.html.starts_with("<!DOCTYPE html"));
        assert!(!result.html.contains("too long"));
    }

    #[test]
    fn test_pipeline_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TranscodePipeline>();
    }
}
