//! Side-by-side layout detection and two-column table construction.
//!
//! Editors place an image beside text with `float:left`. Mail renderers
//! drop floats, so an image meant to sit beside its following content is
//! rebuilt as a one-row table: the image in a fixed-width left cell and the
//! companion content in the right cell. Built tables carry a marker so later
//! passes and re-runs leave them alone.

use super::image::normalize_image;
use super::Stage;
use crate::model::{
    format_number, Document, Element, ElementKind, ImageDescriptor, Length, LengthUnit, NodeId,
    StyleMap,
};
use crate::render::{TranscodeOptions, TranscodeStats};

/// Attribute marking a synthesized layout table.
pub const LAYOUT_MARKER_ATTR: &str = "data-mailprep";

/// Value of [`LAYOUT_MARKER_ATTR`] on layout tables.
pub const LAYOUT_MARKER_VALUE: &str = "layout";

/// Rebuilds side-by-side images as two-column tables.
#[derive(Debug, Default)]
pub struct LayoutTableBuilder;

impl Stage for LayoutTableBuilder {
    fn name(&self) -> &'static str {
        "layout"
    }

    fn apply(&self, doc: &mut Document, options: &TranscodeOptions, stats: &mut TranscodeStats) {
        for img in doc.elements_of_kind(ElementKind::Image) {
            if in_layout_table(doc, img) {
                continue;
            }
            let Some(el) = doc.element(img) else {
                continue;
            };
            let Some(style) = el.style_map() else {
                continue;
            };

            let descriptor = ImageDescriptor::from_element(el);
            if !is_side_by_side(style, &descriptor, options) {
                continue;
            }
            let width = descriptor
                .pixel_width()
                .unwrap_or(options.fallback_image_width_px);
            let columns = Columns {
                width,
                // A percentage stays on the image; only the cell is fixed.
                image_width: (!descriptor.has_relative_width()).then_some(width),
                gutter: right_margin_px(style).unwrap_or(options.side_margin_px as f64),
            };

            let unit = layout_unit(doc, img);
            if doc.parent(unit).is_none() {
                log::debug!("Skipping side-by-side image without a parent");
                continue;
            }

            log::debug!("Image classified as side-by-side ({}px)", width);
            build_table(doc, img, unit, &columns, options, stats);
            stats.layout_tables_built += 1;
        }
    }
}

/// Whether a node sits inside a table built by this stage.
pub fn in_layout_table(doc: &Document, id: NodeId) -> bool {
    doc.ancestors(id).any(|a| {
        doc.element(a).is_some_and(|el| {
            el.kind() == ElementKind::Table && el.attr(LAYOUT_MARKER_ATTR) == Some(LAYOUT_MARKER_VALUE)
        })
    })
}

/// Float left, or a pixel width paired with the characteristic right margin.
fn is_side_by_side(style: &StyleMap, descriptor: &ImageDescriptor, options: &TranscodeOptions) -> bool {
    if style
        .get("float")
        .is_some_and(|f| f.eq_ignore_ascii_case("left"))
    {
        return true;
    }

    descriptor.pixel_width().is_some()
        && right_margin_px(style)
            .is_some_and(|m| (m - options.side_margin_px as f64).abs() < 0.5)
}

/// Effective right margin in pixels.
///
/// `margin-right` and the `margin` shorthand can both be present; the one
/// declared later wins.
fn right_margin_px(style: &StyleMap) -> Option<f64> {
    let longhand = style.position("margin-right");
    let shorthand = style.position("margin");

    let value = match (longhand, shorthand) {
        (Some(l), Some(s)) if s > l => shorthand_right(style.get("margin")?)?,
        (Some(_), _) => style.get("margin-right")?,
        (None, Some(_)) => shorthand_right(style.get("margin")?)?,
        (None, None) => return None,
    };

    let length = Length::parse(value)?;
    match length.unit {
        LengthUnit::Px => Some(length.value),
        LengthUnit::Unitless if length.value == 0.0 => Some(0.0),
        _ => None,
    }
}

fn shorthand_right(margin: &str) -> Option<&str> {
    let parts: Vec<&str> = margin.split_whitespace().collect();
    match parts.len() {
        1 => Some(parts[0]),
        2..=4 => Some(parts[1]),
        _ => None,
    }
}

/// The image, or a link whose only content is the image.
fn layout_unit(doc: &Document, img: NodeId) -> NodeId {
    let Some(parent) = doc.parent(img) else {
        return img;
    };
    if doc.kind(parent) != Some(ElementKind::Link) {
        return img;
    }
    let only_image = doc
        .children(parent)
        .into_iter()
        .all(|c| c == img || doc.is_blank(c));
    if only_image {
        parent
    } else {
        img
    }
}

/// Following siblings of `start`, up to the first one holding an image.
fn collect_following(doc: &Document, start: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut cur = doc.next_sibling(start);
    while let Some(node) = cur {
        if doc.contains_image(node) {
            break;
        }
        out.push(node);
        cur = doc.next_sibling(node);
    }
    out
}

/// A parent element whose only non-blank child is `unit`.
///
/// Table cells and list items are never replaced: the table would leave
/// the row or list it belongs to.
fn is_wrapper_only(doc: &Document, parent: NodeId, unit: NodeId) -> bool {
    let replaceable = !matches!(
        doc.kind(parent),
        None | Some(
            ElementKind::Table | ElementKind::TablePart | ElementKind::ListItem | ElementKind::Raw
        )
    );
    replaceable
        && doc
            .children(parent)
            .into_iter()
            .all(|c| c == unit || doc.is_blank(c))
}

/// Sizing of the image column.
struct Columns {
    /// Image cell width in pixels
    width: u32,
    /// Width forced onto the image, `None` to keep a percentage
    image_width: Option<u32>,
    /// Right padding of the image cell
    gutter: f64,
}

fn build_table(
    doc: &mut Document,
    img: NodeId,
    unit: NodeId,
    columns: &Columns,
    options: &TranscodeOptions,
    stats: &mut TranscodeStats,
) {
    let mut anchor = unit;
    let mut companions = collect_following(doc, unit);

    if let Some(parent) = doc.parent(unit) {
        if is_wrapper_only(doc, parent, unit) {
            anchor = parent;
            companions = collect_following(doc, parent);
        }
    }

    let table = doc.create_element(layout_table_element());
    let tbody = doc.create_element(Element::new("tbody"));
    let row = doc.create_element(Element::new("tr"));
    let image_cell = doc.create_element(image_cell_element(columns.width, columns.gutter));
    let content_cell = doc.create_element(content_cell_element());

    doc.insert_before(anchor, table);
    doc.append_child(table, tbody);
    doc.append_child(tbody, row);
    doc.append_child(row, image_cell);
    doc.append_child(row, content_cell);

    let visible = companions.iter().any(|&c| doc.has_visible_text(c));
    doc.append_child(image_cell, unit);
    for companion in companions {
        doc.append_child(content_cell, companion);
    }
    if !visible {
        let placeholder = doc.create_text("\u{a0}");
        doc.append_child(content_cell, placeholder);
    }
    if anchor != unit {
        doc.detach(anchor);
    }
    lift_out_of_paragraph(doc, table);

    normalize_image(doc, img, columns.image_width, options, stats);
    if let Some(style) = doc.element_mut(img).and_then(|el| el.style_map_mut()) {
        style.remove("margin-right");
        style.remove("margin");
        style.set("display", "block");
    }
}

/// Split the paragraph enclosing `table` so the table sits beside it.
///
/// A `<table>` start tag closes an open `<p>` when the output is parsed
/// again, so a table left inside a paragraph would not survive a re-run.
/// Content after the table moves into a copy of each split element.
fn lift_out_of_paragraph(doc: &mut Document, table: NodeId) {
    let Some(paragraph) = doc
        .ancestors(table)
        .find(|&a| doc.kind(a) == Some(ElementKind::Paragraph))
    else {
        return;
    };

    while let Some(parent) = doc.parent(table) {
        let tail = split_after(doc, parent, table);
        doc.insert_after(parent, table);
        if let Some(tail) = tail {
            doc.insert_after(table, tail);
        }
        if doc.children(parent).into_iter().all(|c| doc.is_blank(c)) {
            doc.detach(parent);
        }
        if parent == paragraph {
            break;
        }
    }
}

/// Move the siblings after `node` into a detached copy of `parent`.
fn split_after(doc: &mut Document, parent: NodeId, node: NodeId) -> Option<NodeId> {
    let mut rest = Vec::new();
    let mut cur = doc.next_sibling(node);
    while let Some(sibling) = cur {
        rest.push(sibling);
        cur = doc.next_sibling(sibling);
    }
    if rest.iter().all(|&c| doc.is_blank(c)) {
        return None;
    }

    let mut copy = doc.element(parent)?.clone();
    copy.remove_attr("id");
    let copy = doc.create_element(copy);
    for sibling in rest {
        doc.append_child(copy, sibling);
    }
    Some(copy)
}

fn layout_table_element() -> Element {
    let mut table = Element::new("table");
    table.set_attr("role", "presentation");
    table.set_attr(LAYOUT_MARKER_ATTR, LAYOUT_MARKER_VALUE);
    table.set_attr("width", "100%");
    table.set_attr("cellpadding", "0");
    table.set_attr("cellspacing", "0");
    table.set_attr("border", "0");
    if let Some(style) = table.style_map_mut() {
        style.set("border-collapse", "collapse");
        style.set("width", "100%");
    }
    table
}

fn image_cell_element(width: u32, gutter: f64) -> Element {
    let mut cell = Element::new("td");
    cell.set_attr("width", width.to_string());
    cell.set_attr("valign", "top");
    if let Some(style) = cell.style_map_mut() {
        style.set("width", format!("{}px", width));
        style.set("vertical-align", "top");
        style.set("padding", format!("0 {}px 0 0", format_number(gutter)));
    }
    cell
}

fn content_cell_element() -> Element {
    let mut cell = Element::new("td");
    cell.set_attr("valign", "top");
    if let Some(style) = cell.style_map_mut() {
        style.set("vertical-align", "top");
    }
    cell
}
