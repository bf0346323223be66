//! Image sizing normalization.
//!
//! Mail renderers ignore floats and percentage caps and often scale by the
//! `width`/`height` attributes alone. Every image ends up with an explicit
//! pixel width when one is known, `height:auto`, a `max-width` safety net,
//! and a `height` attribute computed from the payload's true dimensions.
//! Height given by the author is always discarded.

use super::layout::in_layout_table;
use super::Stage;
use crate::model::{Document, ElementKind, ImageDescriptor, LengthUnit, NodeId};
use crate::render::{TranscodeOptions, TranscodeStats};

/// Normalizes images that were not rebuilt into layout tables.
#[derive(Debug, Default)]
pub struct ImageNormalizer;

impl Stage for ImageNormalizer {
    fn name(&self) -> &'static str {
        "image"
    }

    fn apply(&self, doc: &mut Document, options: &TranscodeOptions, stats: &mut TranscodeStats) {
        for id in doc.elements_of_kind(ElementKind::Image) {
            if in_layout_table(doc, id) {
                continue;
            }
            normalize_image(doc, id, None, options, stats);
        }
    }
}

/// Normalize one image.
///
/// `target_width` overrides the width the author set; layout tables pass
/// the resolved column width. Returns `false` when the image was left
/// alone because its style could not be parsed.
pub(crate) fn normalize_image(
    doc: &mut Document,
    id: NodeId,
    target_width: Option<u32>,
    options: &TranscodeOptions,
    stats: &mut TranscodeStats,
) -> bool {
    let Some(el) = doc.element_mut(id) else {
        return false;
    };
    if el.style.is_unparsable() {
        log::debug!("Skipping image with unparsable style");
        return false;
    }

    let descriptor = ImageDescriptor::from_element(el);
    let relative = target_width.is_none() && descriptor.has_relative_width();
    let width = target_width.or_else(|| descriptor.pixel_width());

    el.remove_attr("height");
    if let Some(style) = el.style_map_mut() {
        style.remove("float");
        if style
            .length("max-width")
            .is_some_and(|l| l.unit == LengthUnit::Percent)
        {
            style.remove("max-width");
        }

        if let (Some(w), false) = (width, relative) {
            style.set("width", format!("{}px", w));
        }
        style.set("height", "auto");
        if !style.contains("max-width") {
            style.set("max-width", "100%");
        }
    }

    if relative {
        stats.images_normalized += 1;
        return true;
    }

    if let Some(w) = width {
        el.set_attr("width", w.to_string());

        if options.emit_height_attribute {
            match descriptor.proportional_height(w) {
                Ok(h) => {
                    el.set_attr("height", h.to_string());
                    stats.heights_computed += 1;
                }
                Err(e) if descriptor.source.is_embedded() => {
                    log::warn!("Omitting image height: {}", e);
                }
                Err(e) => log::debug!("Omitting image height: {}", e),
            }
        }
    }

    stats.images_normalized += 1;
    true
}
