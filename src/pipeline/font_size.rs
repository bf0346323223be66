//! Font-size unit normalization.

use super::Stage;
use crate::model::{format_px, Document, Length, LengthUnit};
use crate::render::{TranscodeOptions, TranscodeStats};

/// CSS absolute-size keywords in pixels.
const SIZE_KEYWORDS: &[(&str, u32)] = &[
    ("xx-small", 9),
    ("x-small", 10),
    ("small", 13),
    ("medium", 16),
    ("large", 18),
    ("x-large", 24),
    ("xx-large", 32),
    ("xxx-large", 48),
];

/// Rewrites every absolute `font-size` as pixels.
#[derive(Debug, Default)]
pub struct FontSizeNormalizer;

impl Stage for FontSizeNormalizer {
    fn name(&self) -> &'static str {
        "font-size"
    }

    fn apply(&self, doc: &mut Document, options: &TranscodeOptions, stats: &mut TranscodeStats) {
        for id in doc.elements() {
            let Some(style) = doc.element_mut(id).and_then(|el| el.style_map_mut()) else {
                continue;
            };
            let Some(current) = style.get("font-size") else {
                continue;
            };

            if let Some(px) = normalize_font_size(current, options.pt_to_px) {
                if px != current {
                    log::debug!("font-size {} -> {}", current, px);
                    style.set("font-size", px);
                    stats.font_sizes_normalized += 1;
                }
            }
        }
    }
}

/// Normalized pixel value for a `font-size`, or `None` for relative sizes.
///
/// Points are rounded to whole pixels; pixel values keep their magnitude.
pub fn normalize_font_size(value: &str, pt_to_px: f64) -> Option<String> {
    let lower = value.trim().to_ascii_lowercase();
    if let Some((_, px)) = SIZE_KEYWORDS.iter().find(|(name, _)| *name == lower) {
        return Some(format!("{}px", px));
    }

    let length = Length::parse(&lower)?;
    match length.unit {
        LengthUnit::Px => Some(format_px(length.value)),
        LengthUnit::Pt => Some(format_px((length.value * pt_to_px).round())),
        _ => None,
    }
}
