//! Minimum font-size enforcement.

use super::Stage;
use crate::model::{Document, LengthUnit};
use crate::render::{TranscodeOptions, TranscodeStats};

/// Raises pixel font sizes below the floor to exactly the floor.
#[derive(Debug, Default)]
pub struct MinimumSizeEnforcer;

impl Stage for MinimumSizeEnforcer {
    fn name(&self) -> &'static str {
        "min-font-size"
    }

    fn apply(&self, doc: &mut Document, options: &TranscodeOptions, stats: &mut TranscodeStats) {
        let floor = options.min_font_size_px as f64;

        for id in doc.elements() {
            let Some(style) = doc.element_mut(id).and_then(|el| el.style_map_mut()) else {
                continue;
            };
            let Some(size) = style.length("font-size") else {
                continue;
            };
            if size.unit != LengthUnit::Px || size.value >= floor {
                continue;
            }

            log::debug!("Raising font-size {}px to {}px", size.value, floor);
            style.set("font-size", format!("{}px", options.min_font_size_px));
            stats.font_sizes_raised += 1;
        }
    }
}
