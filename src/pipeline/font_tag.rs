//! Legacy `font` element rewriting.

use std::num::IntErrorKind;

use super::Stage;
use crate::model::{format_px, Document, ElementKind};
use crate::render::{TranscodeOptions, TranscodeStats};

/// Pixel sizes for legacy size codes 1..=7.
///
/// Code 1 maps to 10px rather than the browser default of about 8px so the
/// smallest code still renders in clients that hide tiny text.
const LEGACY_SIZES_PX: [u32; 7] = [10, 13, 16, 18, 24, 32, 48];

/// Code that relative sizes (`+1`, `-2`) are measured from.
const BASE_SIZE_CODE: i32 = 3;

/// Renames `font` to `span`, moving size, color and face into the style.
#[derive(Debug, Default)]
pub struct FontTagRewriter;

impl Stage for FontTagRewriter {
    fn name(&self) -> &'static str {
        "font-tag"
    }

    fn apply(&self, doc: &mut Document, _options: &TranscodeOptions, stats: &mut TranscodeStats) {
        for id in doc.elements_of_kind(ElementKind::LegacyFont) {
            let Some(el) = doc.element_mut(id) else {
                continue;
            };
            if el.style.is_unparsable() {
                log::debug!("Keeping <font> with unparsable style");
                continue;
            }

            let size = el.remove_attr("size");
            let color = el.remove_attr("color");
            let face = el.remove_attr("face");

            if let Some(style) = el.style_map_mut() {
                if let Some(px) = size.as_deref().and_then(legacy_size_to_px) {
                    if !style.contains("font-size") {
                        style.set("font-size", format_px(px as f64));
                    }
                }
                if let Some(color) = color.filter(|c| !c.trim().is_empty()) {
                    if !style.contains("color") {
                        style.set("color", color.trim());
                    }
                }
                if let Some(face) = face.filter(|f| !f.trim().is_empty()) {
                    if !style.contains("font-family") {
                        style.set("font-family", face.trim().replace('"', "'"));
                    }
                }
            }

            el.rename("span");
            stats.font_tags_rewritten += 1;
        }
    }
}

/// Map a legacy size code to pixels.
///
/// Absolute codes clamp to 1..=7; `+n` and `-n` are offsets from 3.
///
/// ```
/// use mailprep::pipeline::legacy_size_to_px;
///
/// assert_eq!(legacy_size_to_px("1"), Some(10));
/// assert_eq!(legacy_size_to_px("+2"), Some(24));
/// assert_eq!(legacy_size_to_px("big"), None);
/// ```
pub fn legacy_size_to_px(code: &str) -> Option<u32> {
    let code = code.trim();
    let value: i32 = if let Some(rest) = code.strip_prefix('+') {
        BASE_SIZE_CODE.saturating_add(parse_code(rest)?)
    } else if let Some(rest) = code.strip_prefix('-') {
        BASE_SIZE_CODE.saturating_sub(parse_code(rest)?)
    } else {
        parse_code(code)?
    };
    let index = value.clamp(1, 7) as usize - 1;
    Some(LEGACY_SIZES_PX[index])
}

/// Integer code; out-of-range digits saturate since they clamp anyway.
fn parse_code(digits: &str) -> Option<i32> {
    match digits.trim().parse::<i32>() {
        Ok(n) => Some(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i32::MAX),
            IntErrorKind::NegOverflow => Some(i32::MIN),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_html;
    use crate::render::serialize_children;

    fn run(html: &str) -> (String, TranscodeStats) {
        let mut doc = parse_html(html).unwrap();
        let mut stats = TranscodeStats::new();
        FontTagRewriter.apply(&mut doc, &TranscodeOptions::default(), &mut stats);
        (serialize_children(&doc, doc.root()), stats)
    }

    #[test]
    fn test_size_table() {
        let expected = [10, 13, 16, 18, 24, 32, 48];
        for (code, px) in (1..=7).zip(expected) {
            assert_eq!(legacy_size_to_px(&code.to_string()), Some(px));
        }
    }

    #[test]
    fn test_relative_and_clamped_sizes() {
        assert_eq!(legacy_size_to_px("-1"), Some(13));
        assert_eq!(legacy_size_to_px("-5"), Some(10));
        assert_eq!(legacy_size_to_px("+9"), Some(48));
        assert_eq!(legacy_size_to_px("0"), Some(10));
        assert_eq!(legacy_size_to_px("12"), Some(48));
        assert_eq!(legacy_size_to_px(""), None);
    }

    #[test]
    fn test_extreme_codes_clamp() {
        assert_eq!(legacy_size_to_px("+2147483647"), Some(48));
        assert_eq!(legacy_size_to_px("-2147483647"), Some(10));
        assert_eq!(legacy_size_to_px("--2147483648"), Some(48));
        assert_eq!(legacy_size_to_px("+-2147483648"), Some(10));
        assert_eq!(legacy_size_to_px("99999999999999"), Some(48));
        assert_eq!(legacy_size_to_px("-99999999999999"), Some(10));
        assert_eq!(legacy_size_to_px("+"), None);

        let (html, _) = run("<font size=\"+2147483647\">x</font><font size=\"-2147483648\">y</font>");
        assert_eq!(
            html,
            "<span style=\"font-size:48px\">x</span><span style=\"font-size:10px\">y</span>"
        );
    }

    #[test]
    fn test_smallest_code_is_readable() {
        let (html, stats) = run("<font size=\"1\">tiny</font>");
        assert_eq!(html, "<span style=\"font-size:10px\">tiny</span>");
        assert_eq!(stats.font_tags_rewritten, 1);
    }

    #[test]
    fn test_color_and_face_move_to_style() {
        let (html, _) = run("<font size=\"4\" color=\"#336699\" face=\"Verdana\">x</font>");
        assert_eq!(
            html,
            "<span style=\"font-size:18px;color:#336699;font-family:Verdana\">x</span>"
        );
    }

    #[test]
    fn test_inline_declarations_win() {
        let (html, _) = run("<font size=\"7\" color=\"red\" style=\"color:blue;font-size:11px\">x</font>");
        assert_eq!(html, "<span style=\"color:blue;font-size:11px\">x</span>");
    }

    #[test]
    fn test_surrounding_whitespace_is_kept() {
        let (html, _) = run("<p>a <font size=\"2\">b</font> c</p>");
        assert_eq!(html, "<p>a <span style=\"font-size:13px\">b</span> c</p>");
    }

    #[test]
    fn test_nested_font_tags() {
        let (html, stats) = run("<font size=\"5\"><font color=\"green\">x</font></font>");
        assert_eq!(
            html,
            "<span style=\"font-size:24px\"><span style=\"color:green\">x</span></span>"
        );
        assert_eq!(stats.font_tags_rewritten, 2);
    }

    #[test]
    fn test_unparsable_style_skips_element() {
        let (html, stats) = run("<font size=\"1\" style=\"bogus\">x</font>");
        assert_eq!(html, "<font size=\"1\" style=\"bogus\">x</font>");
        assert_eq!(stats.font_tags_rewritten, 0);
    }
}
