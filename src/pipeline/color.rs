//! Text-color normalization.
//!
//! Output is always composed against a light background, so white and
//! near-white foreground colors are rewritten to the replacement color.

use lazy_static::lazy_static;
use regex::Regex;

use super::Stage;
use crate::model::Document;
use crate::render::{TranscodeOptions, TranscodeStats};

lazy_static! {
    static ref RGB: Regex = Regex::new(
        r"(?i)^rgba?\(\s*([\d.]+%?)\s*[,\s]\s*([\d.]+%?)\s*[,\s]\s*([\d.]+%?)\s*(?:[,/]\s*([\d.]+%?)\s*)?\)$"
    )
    .unwrap();
}

/// Light named colors and their channels.
const LIGHT_KEYWORDS: &[(&str, [u8; 3])] = &[
    ("white", [255, 255, 255]),
    ("snow", [255, 250, 250]),
    ("ghostwhite", [248, 248, 255]),
    ("whitesmoke", [245, 245, 245]),
    ("mintcream", [245, 255, 250]),
    ("ivory", [255, 255, 240]),
    ("floralwhite", [255, 250, 240]),
    ("seashell", [255, 245, 238]),
    ("azure", [240, 255, 255]),
    ("aliceblue", [240, 248, 255]),
];

/// Rewrites white and near-white text colors.
#[derive(Debug, Default)]
pub struct TextColorNormalizer;

impl Stage for TextColorNormalizer {
    fn name(&self) -> &'static str {
        "text-color"
    }

    fn apply(&self, doc: &mut Document, options: &TranscodeOptions, stats: &mut TranscodeStats) {
        let threshold = options.near_white_threshold;

        for id in doc.elements() {
            let Some(el) = doc.element_mut(id) else {
                continue;
            };
            if el.style.is_unparsable() {
                continue;
            }

            if let Some(style) = el.style_map_mut() {
                if style.get("color").is_some_and(|c| is_light_color(c, threshold)) {
                    style.set("color", options.replacement_text_color.clone());
                    stats.colors_rewritten += 1;
                }
            }

            if el.attr("color").is_some_and(|c| is_light_color(c, threshold)) {
                el.set_attr("color", options.replacement_text_color.clone());
                stats.colors_rewritten += 1;
            }
        }
    }
}

/// Check whether a color value is white or near-white.
///
/// Every RGB channel must reach `threshold`; `255` accepts pure white only.
/// A fully transparent color never counts as light.
///
/// ```
/// use mailprep::pipeline::is_light_color;
///
/// assert!(is_light_color("#FFF", 255));
/// assert!(is_light_color("rgb(255, 255, 255)", 255));
/// assert!(!is_light_color("#fafafa", 255));
/// assert!(is_light_color("#fafafa", 245));
/// assert!(!is_light_color("rgba(255, 255, 255, 0)", 245));
/// ```
pub fn is_light_color(value: &str, threshold: u8) -> bool {
    parse_rgb(value).is_some_and(|channels| channels.iter().all(|&c| c >= threshold))
}

fn parse_rgb(value: &str) -> Option<[u8; 3]> {
    let value = value.trim();

    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }

    if let Some(caps) = RGB.captures(value) {
        let mut channels = [0u8; 3];
        for (i, slot) in channels.iter_mut().enumerate() {
            *slot = parse_channel(caps.get(i + 1)?.as_str())?;
        }
        if caps.get(4).is_some_and(|a| is_zero_alpha(a.as_str())) {
            return None;
        }
        return Some(channels);
    }

    let lower = value.to_ascii_lowercase();
    LIGHT_KEYWORDS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, rgb)| *rgb)
}

fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let mut channels = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                channels[i] = v * 16 + v;
            }
            Some(channels)
        }
        6 => {
            let mut channels = [0u8; 3];
            for (i, slot) in channels.iter_mut().enumerate() {
                *slot = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
            }
            Some(channels)
        }
        _ => None,
    }
}

fn parse_channel(raw: &str) -> Option<u8> {
    let value = match raw.strip_suffix('%') {
        Some(pct) => pct.parse::<f64>().ok()? * 2.55,
        None => raw.parse::<f64>().ok()?,
    };
    Some(value.round().clamp(0.0, 255.0) as u8)
}

fn is_zero_alpha(raw: &str) -> bool {
    raw.trim_end_matches('%')
        .parse::<f64>()
        .is_ok_and(|a| a <= 0.0)
}
