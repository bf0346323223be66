//! Baseline spacing for block elements.
//!
//! Many clients strip `<style>` blocks, so block spacing has to be inline.
//! Defaults are only added when the author set nothing for that property
//! family.

use super::Stage;
use crate::model::{Document, ElementKind};
use crate::render::{TranscodeOptions, TranscodeStats};

/// Inline `margin` and `padding` defaults for an element kind.
fn defaults_for(kind: ElementKind) -> Option<(&'static str, &'static str)> {
    match kind {
        ElementKind::Paragraph => Some(("0 0 1em 0", "0")),
        ElementKind::Heading(_) => Some(("0 0 0.5em 0", "0")),
        ElementKind::Container => Some(("0", "0")),
        ElementKind::List => Some(("0 0 1em 0", "0 0 0 2em")),
        ElementKind::ListItem
        | ElementKind::Table
        | ElementKind::TablePart
        | ElementKind::Image
        | ElementKind::Link
        | ElementKind::InlineText
        | ElementKind::LineBreak
        | ElementKind::LegacyFont
        | ElementKind::Raw
        | ElementKind::Other => None,
    }
}

/// Adds baseline margins and padding to paragraphs, headings, containers
/// and lists.
#[derive(Debug, Default)]
pub struct BlockDefaultInliner;

impl Stage for BlockDefaultInliner {
    fn name(&self) -> &'static str {
        "block-defaults"
    }

    fn apply(&self, doc: &mut Document, _options: &TranscodeOptions, stats: &mut TranscodeStats) {
        for id in doc.elements() {
            let Some(el) = doc.element_mut(id) else {
                continue;
            };
            let Some((margin, padding)) = defaults_for(el.kind()) else {
                continue;
            };
            let Some(style) = el.style_map_mut() else {
                continue;
            };

            let mut changed = false;
            if !style.contains_family("margin") {
                style.set("margin", margin);
                changed = true;
            }
            if !style.contains_family("padding") {
                style.set("padding", padding);
                changed = true;
            }
            if changed {
                stats.blocks_defaulted += 1;
            }
        }
    }
}
