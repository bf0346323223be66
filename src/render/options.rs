//! Transcoding options and configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::ParseOptions;

/// Option presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Typography only: colors, font tags, sizes, line heights, shell
    Minimal,
    /// Every stage (default)
    #[default]
    Standard,
    /// Every stage with a 12px readability floor
    Strict,
}

/// Options for transcoding editor markup into mail-safe markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodeOptions {
    /// Smallest font size, in pixels, allowed in the output
    pub min_font_size_px: u32,

    /// Font size assumed for elements without their own pixel size
    pub default_font_size_px: u32,

    /// Pixels per point
    pub pt_to_px: f64,

    /// Width of a side-by-side image that declares no width
    pub fallback_image_width_px: u32,

    /// Right margin, in pixels, that marks an image as sitting beside text
    pub side_margin_px: u32,

    /// Foreground color that replaces white and near-white text
    pub replacement_text_color: String,

    /// Minimum value of every RGB channel for a color to count as near-white
    pub near_white_threshold: u8,

    /// Emit computed `height` attributes on images with measurable payloads
    pub emit_height_attribute: bool,

    /// Rewrite white and near-white text colors
    pub normalize_colors: bool,

    /// Rewrite legacy `font` elements
    pub rewrite_font_tags: bool,

    /// Convert font sizes to pixels
    pub normalize_font_units: bool,

    /// Convert line heights to pixels
    pub normalize_line_height: bool,

    /// Raise font sizes below the floor
    pub enforce_min_font_size: bool,

    /// Rebuild side-by-side images as two-column tables
    pub build_layout_tables: bool,

    /// Fix sizing of images outside layout tables
    pub normalize_images: bool,

    /// Inline baseline margins and padding on blocks
    pub inline_block_defaults: bool,

    /// Wrap the fragment in a complete document shell
    pub wrap_template: bool,

    /// Base font family of the shell wrapper
    pub font_family: String,

    /// Document title placed in the shell
    pub title: String,

    /// Parser options
    pub parse: ParseOptions,
}

impl TranscodeOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create options from a preset.
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Minimal => Self::minimal(),
            Preset::Standard => Self::standard(),
            Preset::Strict => Self::strict(),
        }
    }

    /// Typography stages and the shell only.
    pub fn minimal() -> Self {
        Self {
            build_layout_tables: false,
            normalize_images: false,
            inline_block_defaults: false,
            ..Self::standard()
        }
    }

    /// Every stage with the default 10px floor.
    pub fn standard() -> Self {
        Self {
            min_font_size_px: 10,
            default_font_size_px: 16,
            pt_to_px: 1.333,
            fallback_image_width_px: 260,
            side_margin_px: 15,
            replacement_text_color: "#000000".to_string(),
            near_white_threshold: 245,
            emit_height_attribute: true,
            normalize_colors: true,
            rewrite_font_tags: true,
            normalize_font_units: true,
            normalize_line_height: true,
            enforce_min_font_size: true,
            build_layout_tables: true,
            normalize_images: true,
            inline_block_defaults: true,
            wrap_template: true,
            font_family: "Arial, Helvetica, sans-serif".to_string(),
            title: String::new(),
            parse: ParseOptions::default(),
        }
    }

    /// Every stage with a 12px floor.
    pub fn strict() -> Self {
        Self {
            min_font_size_px: 12,
            ..Self::standard()
        }
    }

    /// Load options from JSON; missing fields take their defaults.
    ///
    /// ```
    /// use mailprep::TranscodeOptions;
    ///
    /// let options = TranscodeOptions::from_json(r#"{"min_font_size_px": 11}"#).unwrap();
    /// assert_eq!(options.min_font_size_px, 11);
    /// assert_eq!(options.fallback_image_width_px, 260);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Serialize options to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check option values for consistency.
    pub fn validate(&self) -> Result<()> {
        if self.min_font_size_px == 0 {
            return Err(Error::Config("min_font_size_px must be positive".into()));
        }
        if self.default_font_size_px == 0 {
            return Err(Error::Config("default_font_size_px must be positive".into()));
        }
        if !(self.pt_to_px.is_finite() && self.pt_to_px > 0.0) {
            return Err(Error::Config("pt_to_px must be a positive number".into()));
        }
        if self.fallback_image_width_px == 0 {
            return Err(Error::Config(
                "fallback_image_width_px must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Set the minimum font size.
    pub fn with_min_font_size(mut self, px: u32) -> Self {
        self.min_font_size_px = px;
        self
    }

    /// Set the default font size.
    pub fn with_default_font_size(mut self, px: u32) -> Self {
        self.default_font_size_px = px;
        self
    }

    /// Set the fallback width for side-by-side images.
    pub fn with_fallback_image_width(mut self, px: u32) -> Self {
        self.fallback_image_width_px = px;
        self
    }

    /// Set the right margin recognized as side-by-side spacing.
    pub fn with_side_margin(mut self, px: u32) -> Self {
        self.side_margin_px = px;
        self
    }

    /// Enable or disable the document shell.
    pub fn with_template(mut self, wrap: bool) -> Self {
        self.wrap_template = wrap;
        self
    }

    /// Enable or disable layout table construction.
    pub fn with_layout_tables(mut self, build: bool) -> Self {
        self.build_layout_tables = build;
        self
    }

    /// Enable or disable computed image height attributes.
    pub fn with_height_attributes(mut self, emit: bool) -> Self {
        self.emit_height_attribute = emit;
        self
    }

    /// Set the shell font family.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Set the shell title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set parser options.
    pub fn with_parse_options(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcode_options_builder() {
        let options = TranscodeOptions::new()
            .with_min_font_size(11)
            .with_fallback_image_width(300)
            .with_template(false)
            .with_title("Newsletter");

        assert_eq!(options.min_font_size_px, 11);
        assert_eq!(options.fallback_image_width_px, 300);
        assert!(!options.wrap_template);
        assert_eq!(options.title, "Newsletter");
    }

    #[test]
    fn test_defaults() {
        let options = TranscodeOptions::default();
        assert_eq!(options.min_font_size_px, 10);
        assert_eq!(options.default_font_size_px, 16);
        assert_eq!(options.fallback_image_width_px, 260);
        assert_eq!(options.side_margin_px, 15);
        assert!(options.build_layout_tables);
        assert!(options.wrap_template);
    }

    #[test]
    fn test_presets() {
        let minimal = TranscodeOptions::from_preset(Preset::Minimal);
        assert!(!minimal.build_layout_tables);
        assert!(!minimal.normalize_images);
        assert!(minimal.enforce_min_font_size);

        let strict = TranscodeOptions::from_preset(Preset::Strict);
        assert_eq!(strict.min_font_size_px, 12);
        assert!(strict.build_layout_tables);

        assert_eq!(
            TranscodeOptions::from_preset(Preset::default()),
            TranscodeOptions::default()
        );
    }

    #[test]
    fn test_json_roundtrip_defaults() {
        let json = TranscodeOptions::strict().to_json().unwrap();
        let parsed = TranscodeOptions::from_json(&json).unwrap();
        assert_eq!(parsed, TranscodeOptions::strict());
    }

    #[test]
    fn test_json_rejects_invalid_values() {
        assert!(TranscodeOptions::from_json(r#"{"min_font_size_px": 0}"#).is_err());
        assert!(TranscodeOptions::from_json(r#"{"pt_to_px": -1.0}"#).is_err());
        assert!(TranscodeOptions::from_json("not json").is_err());
    }

    #[test]
    fn test_json_nested_parse_options() {
        let options =
            TranscodeOptions::from_json(r#"{"parse": {"keep_comments": false}}"#).unwrap();
        assert!(!options.parse.keep_comments);
        assert!(options.parse.detect_transcoded);
    }
}
