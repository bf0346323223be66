//! Arena-backed document tree.
//!
//! Nodes live in a single `Vec` and are addressed by [`NodeId`]. Links
//! (parent, first/last child, previous/next sibling) are explicit, so
//! detaching a node during a sibling walk never invalidates another id.
//! Detached nodes stay in the arena but are unreachable from the root.

use super::style::{Style, StyleMap};

/// Stable index of a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Closed classification of element tags.
///
/// Stages dispatch on this rather than on tag strings, so every kind is
/// handled explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// `h1`..`h6`
    Heading(u8),
    /// `p`
    Paragraph,
    /// Generic block containers (`div`, `section`, `blockquote`, ...)
    Container,
    /// `ul`, `ol`, `dl`
    List,
    /// `li`, `dt`, `dd`
    ListItem,
    /// `table`
    Table,
    /// Table internals (`tbody`, `tr`, `td`, ...)
    TablePart,
    /// `img`
    Image,
    /// `a`
    Link,
    /// Inline text containers (`span`, `b`, `em`, ...)
    InlineText,
    /// `br`
    LineBreak,
    /// Legacy `font`
    LegacyFont,
    /// Elements whose content is never transformed (`script`, `style`, ...)
    Raw,
    /// Anything else
    Other,
}

impl ElementKind {
    /// Classify a lowercase tag name.
    pub fn classify(tag: &str) -> Self {
        match tag {
            "h1" => ElementKind::Heading(1),
            "h2" => ElementKind::Heading(2),
            "h3" => ElementKind::Heading(3),
            "h4" => ElementKind::Heading(4),
            "h5" => ElementKind::Heading(5),
            "h6" => ElementKind::Heading(6),
            "p" => ElementKind::Paragraph,
            "div" | "section" | "article" | "header" | "footer" | "main" | "aside" | "nav"
            | "blockquote" | "center" | "figure" | "figcaption" | "address" | "pre" => {
                ElementKind::Container
            }
            "ul" | "ol" | "dl" => ElementKind::List,
            "li" | "dt" | "dd" => ElementKind::ListItem,
            "table" => ElementKind::Table,
            "thead" | "tbody" | "tfoot" | "tr" | "td" | "th" | "caption" | "colgroup" | "col" => {
                ElementKind::TablePart
            }
            "img" => ElementKind::Image,
            "a" => ElementKind::Link,
            "span" | "b" | "strong" | "i" | "em" | "u" | "s" | "strike" | "del" | "ins" | "sub"
            | "sup" | "small" | "big" | "code" | "mark" | "label" | "abbr" | "cite" | "q" => {
                ElementKind::InlineText
            }
            "br" => ElementKind::LineBreak,
            "font" => ElementKind::LegacyFont,
            "script" | "style" | "head" | "title" | "meta" | "link" | "template" | "xml"
            | "noscript" | "iframe" | "object" | "svg" | "math" => ElementKind::Raw,
            _ => ElementKind::Other,
        }
    }
}

/// An element: tag, attributes (excluding `style`) and parsed style.
#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    kind: ElementKind,
    attrs: Vec<(String, String)>,
    /// Inline style, parsed once at tree construction
    pub style: Style,
}

impl Element {
    /// Create an element with no attributes and an empty style.
    pub fn new(tag: &str) -> Self {
        let tag = tag.to_ascii_lowercase();
        Self {
            kind: ElementKind::classify(&tag),
            tag,
            attrs: Vec::new(),
            style: Style::default(),
        }
    }

    /// Create an element from raw attributes; a `style` attribute is parsed.
    pub fn with_attributes(tag: &str, attrs: Vec<(String, String)>) -> Self {
        let mut element = Self::new(tag);
        let mut raw_style = None;
        for (name, value) in attrs {
            let name = name.to_ascii_lowercase();
            if name == "style" {
                raw_style = Some(value);
            } else {
                element.set_attr(&name, value);
            }
        }
        element.style = Style::from_attribute(raw_style.as_deref());
        element
    }

    /// Lowercase tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Element classification.
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Rename the element in place, keeping children and attributes.
    pub fn rename(&mut self, tag: &str) {
        self.tag = tag.to_ascii_lowercase();
        self.kind = ElementKind::classify(&self.tag);
    }

    /// Get an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Check whether an attribute is present.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute, keeping its position when it already exists.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    /// Remove an attribute, returning its value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let idx = self.attrs.iter().position(|(n, _)| n == name)?;
        Some(self.attrs.remove(idx).1)
    }

    /// Attributes in source order (without `style`).
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Parsed style, unless the source style was unparsable.
    pub fn style_map(&self) -> Option<&StyleMap> {
        self.style.map()
    }

    /// Parsed style for mutation, unless the source style was unparsable.
    pub fn style_map_mut(&mut self) -> Option<&mut StyleMap> {
        self.style.map_mut()
    }
}

/// Node payload.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// The fragment root
    Root,
    /// An element
    Element(Element),
    /// Character data
    Text(String),
    /// A comment
    Comment(String),
}

/// A node with its tree links.
#[derive(Debug, Clone)]
pub struct Node {
    /// Payload
    pub data: NodeData,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }
}

/// A mutable markup fragment owned by one conversion.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Create an empty document with a root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Root)],
            root: NodeId(0),
        }
    }

    /// The fragment root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Access a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Element payload of a node, if it is an element.
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Mutable element payload of a node, if it is an element.
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Kind of an element node.
    pub fn kind(&self, id: NodeId) -> Option<ElementKind> {
        self.element(id).map(Element::kind)
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Node::new(data));
        NodeId(self.nodes.len() - 1)
    }

    /// Add a detached element.
    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.push(NodeData::Element(element))
    }

    /// Add a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Text(text.into()))
    }

    /// Add a detached comment node.
    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Comment(text.into()))
    }

    /// Parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Next sibling of a node.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].next_sibling
    }

    /// Previous sibling of a node.
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].prev_sibling
    }

    /// First child of a node.
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].first_child
    }

    /// Unlink a node from its parent and siblings. Its subtree stays intact.
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[id.0];
            (node.parent, node.prev_sibling, node.next_sibling)
        };

        match prev {
            Some(p) => self.nodes[p.0].next_sibling = next,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.0].first_child = next;
                }
            }
        }
        match next {
            Some(n) => self.nodes[n.0].prev_sibling = prev,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.0].last_child = prev;
                }
            }
        }

        let node = &mut self.nodes[id.0];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let last = self.nodes[parent.0].last_child;

        {
            let node = &mut self.nodes[child.0];
            node.parent = Some(parent);
            node.prev_sibling = last;
        }
        match last {
            Some(l) => self.nodes[l.0].next_sibling = Some(child),
            None => self.nodes[parent.0].first_child = Some(child),
        }
        self.nodes[parent.0].last_child = Some(child);
    }

    /// Insert `child` immediately before `reference`, detaching it first.
    ///
    /// Does nothing when `reference` has no parent.
    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) {
        let Some(parent) = self.parent(reference) else {
            return;
        };
        self.detach(child);
        let prev = self.nodes[reference.0].prev_sibling;

        {
            let node = &mut self.nodes[child.0];
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = Some(reference);
        }
        self.nodes[reference.0].prev_sibling = Some(child);
        match prev {
            Some(p) => self.nodes[p.0].next_sibling = Some(child),
            None => self.nodes[parent.0].first_child = Some(child),
        }
    }

    /// Insert `child` immediately after `reference`, detaching it first.
    ///
    /// Does nothing when `reference` has no parent.
    pub fn insert_after(&mut self, reference: NodeId, child: NodeId) {
        if child == reference {
            return;
        }
        match self.next_sibling(reference) {
            Some(next) if next == child => {}
            Some(next) => self.insert_before(next, child),
            None => {
                if let Some(parent) = self.parent(reference) {
                    self.append_child(parent, child);
                }
            }
        }
    }

    /// Children of a node, as a snapshot.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.first_child(id);
        while let Some(child) = cur {
            out.push(child);
            cur = self.next_sibling(child);
        }
        out
    }

    /// Descendants of a node in document order (excluding the node itself).
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }

    /// Ancestors of a node, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// Whether a node is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root || self.ancestors(id).any(|a| a == self.root)
    }

    /// Attached element nodes in document order.
    pub fn elements(&self) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| self.element(id).is_some())
            .collect()
    }

    /// Attached elements of a given kind in document order.
    pub fn elements_of_kind(&self, kind: ElementKind) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|&id| self.kind(id) == Some(kind))
            .collect()
    }

    /// Whether the node is an image or has an image descendant.
    pub fn contains_image(&self, id: NodeId) -> bool {
        self.kind(id) == Some(ElementKind::Image)
            || self
                .descendants(id)
                .into_iter()
                .any(|d| self.kind(d) == Some(ElementKind::Image))
    }

    /// Concatenated text of a node and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let NodeData::Text(text) = &self.node(id).data {
            out.push_str(text);
        }
        for d in self.descendants(id) {
            if let NodeData::Text(text) = &self.node(d).data {
                out.push_str(text);
            }
        }
        out
    }

    /// Whether a node carries text that renders as something other than
    /// whitespace. Non-breaking spaces count as whitespace.
    pub fn has_visible_text(&self, id: NodeId) -> bool {
        self.text_content(id)
            .chars()
            .any(|c| !c.is_whitespace() && c != '\u{a0}')
    }

    /// Whether a node is whitespace-only text or a comment.
    pub fn is_blank(&self, id: NodeId) -> bool {
        match &self.node(id).data {
            NodeData::Text(text) => text.chars().all(|c| c.is_whitespace()),
            NodeData::Comment(_) => true,
            _ => false,
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
