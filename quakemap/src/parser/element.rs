//! Minimal owned element tree for one event block.
//!
//! Only the subtree of a single `event` element is ever materialized, so a
//! month-long feed is decoded one event at a time.

/// A node inside an event subtree.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Element(Element),
    Text(String),
}

/// An element with its local name and whether it belongs to the feed
/// namespace.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Element {
    name: String,
    in_namespace: bool,
    children: Vec<Node>,
}

impl Element {
    pub(crate) fn new(name: impl Into<String>, in_namespace: bool) -> Self {
        Self {
            name: name.into(),
            in_namespace,
            children: Vec::new(),
        }
    }

    pub(crate) fn push_element(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub(crate) fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    /// Returns true if this element is `name` in the feed namespace.
    #[inline]
    pub(crate) fn is(&self, name: &str) -> bool {
        self.in_namespace && self.name == name
    }

    /// Direct child elements in document order.
    pub(crate) fn elements(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// First direct child named `name`.
    pub(crate) fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.is(name))
    }

    /// All descendant elements (excluding `self`) in document order.
    pub(crate) fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.elements().rev().collect(),
        }
    }

    /// First descendant named `name`.
    pub(crate) fn find(&self, name: &str) -> Option<&Element> {
        self.descendants().find(|e| e.is(name))
    }

    /// First `child` element under the first descendant `parent` that has one.
    ///
    /// `origin.find_path("latitude", "value")` selects the latitude value of
    /// an origin block.
    pub(crate) fn find_path(&self, parent: &str, child: &str) -> Option<&Element> {
        self.descendants()
            .filter(|e| e.is(parent))
            .find_map(|e| e.child(child))
    }

    /// Concatenated text of this element and all of its descendants.
    pub(crate) fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }
}

/// Pre-order iterator over descendant elements.
pub(crate) struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.elements().rev());
        Some(next)
    }
}
