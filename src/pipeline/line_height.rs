//! Line-height normalization.

use super::Stage;
use crate::model::{format_px, Document, Length, LengthUnit};
use crate::render::{TranscodeOptions, TranscodeStats};

const EXACTNESS_RULE: &str = "mso-line-height-rule";

/// Converts relative line heights to pixels against the element's own
/// font size, and pins them with an exactness rule.
#[derive(Debug, Default)]
pub struct LineHeightNormalizer;

impl Stage for LineHeightNormalizer {
    fn name(&self) -> &'static str {
        "line-height"
    }

    fn apply(&self, doc: &mut Document, options: &TranscodeOptions, stats: &mut TranscodeStats) {
        for id in doc.elements() {
            let Some(style) = doc.element_mut(id).and_then(|el| el.style_map_mut()) else {
                continue;
            };
            let Some(line_height) = style.length("line-height") else {
                continue;
            };

            let font_size = style
                .length("font-size")
                .filter(|l| l.unit == LengthUnit::Px && l.value > 0.0)
                .map(|l| l.value)
                .unwrap_or(options.default_font_size_px as f64);

            let Some(px) = resolve_line_height(line_height, font_size, options.pt_to_px) else {
                continue;
            };

            style.set("line-height", format_px(px));
            style.set_after("line-height", EXACTNESS_RULE, "exactly");
            stats.line_heights_normalized += 1;
        }
    }
}

/// Pixel line height for a parsed `line-height` value.
fn resolve_line_height(line_height: Length, font_size_px: f64, pt_to_px: f64) -> Option<f64> {
    let px = match line_height.unit {
        LengthUnit::Unitless | LengthUnit::Em => line_height.value * font_size_px,
        LengthUnit::Percent => line_height.value / 100.0 * font_size_px,
        LengthUnit::Px | LengthUnit::Pt => line_height.to_px(pt_to_px)?,
        LengthUnit::Rem => return None,
    };
    if px <= 0.0 {
        return None;
    }
    Some(px.round())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_html;
    use crate::render::serialize_children;

    fn run(html: &str) -> String {
        let mut doc = parse_html(html).unwrap();
        let mut stats = TranscodeStats::new();
        LineHeightNormalizer.apply(&mut doc, &TranscodeOptions::default(), &mut stats);
        serialize_children(&doc, doc.root())
    }

    #[test]
    fn test_unitless_uses_own_font_size() {
        assert_eq!(
            run("<p style=\"font-size:20px;line-height:1.5\">x</p>"),
            "<p style=\"font-size:20px;line-height:30px;mso-line-height-rule:exactly\">x</p>"
        );
    }

    #[test]
    fn test_falls_back_to_default_size() {
        assert_eq!(
            run("<p style=\"line-height:1.2em;color:red\">x</p>"),
            "<p style=\"line-height:19px;mso-line-height-rule:exactly;color:red\">x</p>"
        );
        assert_eq!(
            run("<p style=\"font-size:1.5em;line-height:150%\">x</p>"),
            "<p style=\"font-size:1.5em;line-height:24px;mso-line-height-rule:exactly\">x</p>"
        );
    }

    #[test]
    fn test_pixels_and_points() {
        assert_eq!(
            run("<p style=\"line-height:18px\">x</p>"),
            "<p style=\"line-height:18px;mso-line-height-rule:exactly\">x</p>"
        );
        assert_eq!(
            run("<p style=\"line-height:15pt\">x</p>"),
            "<p style=\"line-height:20px;mso-line-height-rule:exactly\">x</p>"
        );
    }

    #[test]
    fn test_existing_rule_is_replaced() {
        assert_eq!(
            run("<p style=\"mso-line-height-rule:at-least;line-height:2\">x</p>"),
            "<p style=\"line-height:32px;mso-line-height-rule:exactly\">x</p>"
        );
    }

    #[test]
    fn test_keywords_untouched() {
        assert_eq!(
            run("<p style=\"line-height:normal\">x</p>"),
            "<p style=\"line-height:normal\">x</p>"
        );
    }

    #[test]
    fn test_rerun_is_stable() {
        let once = run("<p style=\"line-height:1.5\">x</p>");
        assert_eq!(run(&once), once);
    }
}
