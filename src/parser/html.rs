//! HTML parsing into the arena document tree using html5ever.

use std::io;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::ParseOpts;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use super::ParseOptions;
use crate::detect::{detect_markup, MarkupKind};
use crate::error::{Error, Result};
use crate::model::{Document, Element, NodeId};
use crate::render::WRAPPER_CLASS;

/// Parse markup with default options.
///
/// # Example
///
/// ```
/// use mailprep::parser::parse_html;
///
/// let doc = parse_html("<p>Hello <b>World</b></p>").unwrap();
/// assert_eq!(doc.text_content(doc.root()), "Hello World");
/// ```
pub fn parse_html(html: &str) -> Result<Document> {
    parse_html_with_options(html, &ParseOptions::default())
}

/// Parse markup into a [`Document`] whose root holds the body content.
///
/// Full documents contribute only their body; previously transcoded
/// documents contribute only the content of their wrapper.
pub fn parse_html_with_options(html: &str, options: &ParseOptions) -> Result<Document> {
    if options.max_input_bytes > 0 && html.len() > options.max_input_bytes {
        return Err(Error::HtmlParse(format!(
            "input is {} bytes, limit is {}",
            html.len(),
            options.max_input_bytes
        )));
    }

    let kind = detect_markup(html);

    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };

    let mut reader = io::Cursor::new(html.as_bytes());
    let dom = parse_document(RcDom::default(), opts)
        .from_utf8()
        .read_from(&mut reader)
        .map_err(|e| Error::HtmlParse(format!("Failed to parse HTML: {}", e)))?;

    let body = find_element(&dom.document, |tag, _| tag == "body")
        .ok_or_else(|| Error::HtmlParse("document has no body".to_string()))?;

    let content = if options.detect_transcoded && kind == MarkupKind::Transcoded {
        match find_element(&body, |_, class| {
            class.is_some_and(|c| c.split_whitespace().any(|c| c == WRAPPER_CLASS))
        }) {
            Some(wrapper) => wrapper,
            None => {
                log::warn!("Transcoded input without a wrapper element; using body");
                body
            }
        }
    } else {
        body
    };

    let mut doc = Document::new();
    let root = doc.root();
    convert_children(&content, &mut doc, root, options);

    log::debug!("Parsed {} into {} elements", kind, doc.elements().len());
    Ok(doc)
}

/// Depth-first search for the first element matching `(tag, class)`.
fn find_element<F>(start: &Handle, matches: F) -> Option<Handle>
where
    F: Fn(&str, Option<&str>) -> bool,
{
    let mut stack = vec![start.clone()];
    while let Some(handle) = stack.pop() {
        if let RcNodeData::Element { name, attrs, .. } = &handle.data {
            let attrs = attrs.borrow();
            let class = attrs
                .iter()
                .find(|a| &*a.name.local == "class")
                .map(|a| &*a.value);
            if matches(&*name.local, class) {
                return Some(handle.clone());
            }
        }
        let children = handle.children.borrow();
        stack.extend(children.iter().rev().cloned());
    }
    None
}

/// Copy the children of an rcdom node into the arena under `parent`.
fn convert_children(handle: &Handle, doc: &mut Document, parent: NodeId, options: &ParseOptions) {
    let mut stack: Vec<(Handle, NodeId)> = handle
        .children
        .borrow()
        .iter()
        .rev()
        .map(|child| (child.clone(), parent))
        .collect();

    while let Some((handle, parent)) = stack.pop() {
        let id = match &handle.data {
            RcNodeData::Element { name, attrs, .. } => {
                let attributes = attrs
                    .borrow()
                    .iter()
                    .map(|a| (a.name.local.to_string(), a.value.to_string()))
                    .collect();
                doc.create_element(Element::with_attributes(&name.local, attributes))
            }
            RcNodeData::Text { contents } => doc.create_text(contents.borrow().to_string()),
            RcNodeData::Comment { contents } if options.keep_comments => {
                doc.create_comment(contents.to_string())
            }
            _ => continue,
        };
        doc.append_child(parent, id);

        let children = handle.children.borrow();
        stack.extend(children.iter().rev().map(|child| (child.clone(), id)));
    }
}
