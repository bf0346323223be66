//! Serialization of the arena tree back to markup.

use crate::model::{Document, NodeData, NodeId};

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose text content is written without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// Serialize the children of a node.
pub fn serialize_children(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    let raw = is_raw_text(doc, id);
    for child in doc.children(id) {
        write_node(doc, child, raw, &mut out);
    }
    out
}

/// Serialize a node including its own tag.
pub fn serialize_node(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    let raw = doc.parent(id).is_some_and(|p| is_raw_text(doc, p));
    write_node(doc, id, raw, &mut out);
    out
}

fn is_raw_text(doc: &Document, id: NodeId) -> bool {
    doc.element(id)
        .is_some_and(|el| RAW_TEXT_ELEMENTS.contains(&el.tag()))
}

fn write_node(doc: &Document, id: NodeId, raw_text: bool, out: &mut String) {
    match &doc.node(id).data {
        NodeData::Root => {
            for child in doc.children(id) {
                write_node(doc, child, false, out);
            }
        }
        NodeData::Text(text) if raw_text => out.push_str(text),
        NodeData::Text(text) => escape_text(text, out),
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Element(el) => {
            out.push('<');
            out.push_str(el.tag());
            for (name, value) in el.attrs() {
                write_attribute(name, value, out);
            }
            if let Some(style) = el.style.to_attribute() {
                write_attribute("style", &style, out);
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&el.tag()) {
                return;
            }

            let raw = RAW_TEXT_ELEMENTS.contains(&el.tag());
            for child in doc.children(id) {
                write_node(doc, child, raw, out);
            }

            out.push_str("</");
            out.push_str(el.tag());
            out.push('>');
        }
    }
}

fn write_attribute(name: &str, value: &str, out: &mut String) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Escape character data; non-breaking spaces are written as `&nbsp;`.
pub fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Element;
    use crate::parser::parse_html;

    #[test]
    fn test_serialize_roundtrip_simple() {
        let doc = parse_html("<p class=\"a\">Hello &amp; <b>bye</b></p>").unwrap();
        assert_eq!(
            serialize_children(&doc, doc.root()),
            "<p class=\"a\">Hello &amp; <b>bye</b></p>"
        );
    }

    #[test]
    fn test_serialize_void_and_style() {
        let doc = parse_html("<img src=\"a.png\" style=\"WIDTH: 10px\"><br>").unwrap();
        assert_eq!(
            serialize_children(&doc, doc.root()),
            "<img src=\"a.png\" style=\"width:10px\"><br>"
        );
    }

    #[test]
    fn test_serialize_unparsable_style_verbatim() {
        let doc = parse_html("<span style=\"color red\">x</span>").unwrap();
        assert_eq!(
            serialize_children(&doc, doc.root()),
            "<span style=\"color red\">x</span>"
        );
    }

    #[test]
    fn test_serialize_nbsp_and_quotes() {
        let mut doc = crate::model::Document::new();
        let mut el = Element::new("td");
        el.set_attr("title", "a \"b\"");
        let td = doc.create_element(el);
        let text = doc.create_text("\u{a0}");
        let root = doc.root();
        doc.append_child(root, td);
        doc.append_child(td, text);
        assert_eq!(
            serialize_node(&doc, td),
            "<td title=\"a &quot;b&quot;\">&nbsp;</td>"
        );
    }

    #[test]
    fn test_serialize_raw_text() {
        let doc = parse_html("<p>a</p><style>p > a { color: red }</style>").unwrap();
        let out = serialize_children(&doc, doc.root());
        assert!(out.contains("<style>p > a { color: red }</style>"));
    }

    #[test]
    fn test_serialize_comment() {
        let doc = parse_html("<p>a</p><!--[if mso]>x<![endif]-->").unwrap();
        assert_eq!(
            serialize_children(&doc, doc.root()),
            "<p>a</p><!--[if mso]>x<![endif]-->"
        );
    }
}
