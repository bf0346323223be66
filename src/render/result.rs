//! Transcoding result with statistics.

use serde::{Deserialize, Serialize};

/// Result of transcoding markup, including statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodeResult {
    /// The transcoded markup
    pub html: String,

    /// What the pipeline changed
    pub stats: TranscodeStats,
}

impl TranscodeResult {
    /// Create a new transcode result.
    pub fn new(html: String, stats: TranscodeStats) -> Self {
        Self { html, stats }
    }

    /// Get the output length in bytes.
    pub fn content_len(&self) -> usize {
        self.html.len()
    }
}

/// Counters collected while transcoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscodeStats {
    /// Elements in the parsed fragment
    pub element_count: u32,

    /// Style attributes left untouched because they failed to parse
    pub unparsable_styles: u32,

    /// White or near-white colors replaced
    pub colors_rewritten: u32,

    /// Legacy `font` elements rewritten
    pub font_tags_rewritten: u32,

    /// Font sizes converted to pixels
    pub font_sizes_normalized: u32,

    /// Font sizes raised to the floor
    pub font_sizes_raised: u32,

    /// Line heights converted to pixels
    pub line_heights_normalized: u32,

    /// Two-column layout tables built
    pub layout_tables_built: u32,

    /// Images whose sizing was normalized
    pub images_normalized: u32,

    /// Image heights computed from intrinsic dimensions
    pub heights_computed: u32,

    /// Blocks that received default spacing
    pub blocks_defaulted: u32,

    /// Whether the input failed to parse and an empty shell was produced
    pub parse_failed: bool,
}

impl TranscodeStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of changes made by the pipeline stages.
    pub fn total_changes(&self) -> u32 {
        self.colors_rewritten
            + self.font_tags_rewritten
            + self.font_sizes_normalized
            + self.font_sizes_raised
            + self.line_heights_normalized
            + self.layout_tables_built
            + self.images_normalized
            + self.blocks_defaulted
    }

    /// Add the counters of another run.
    pub fn merge(&mut self, other: &TranscodeStats) {
        self.element_count += other.element_count;
        self.unparsable_styles += other.unparsable_styles;
        self.colors_rewritten += other.colors_rewritten;
        self.font_tags_rewritten += other.font_tags_rewritten;
        self.font_sizes_normalized += other.font_sizes_normalized;
        self.font_sizes_raised += other.font_sizes_raised;
        self.line_heights_normalized += other.line_heights_normalized;
        self.layout_tables_built += other.layout_tables_built;
        self.images_normalized += other.images_normalized;
        self.heights_computed += other.heights_computed;
        self.blocks_defaulted += other.blocks_defaulted;
        self.parse_failed |= other.parse_failed;
    }
}
