//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it to our DOM format. Text is kept
//! as parsed, whitespace-only runs included.

use fos_dom::{Document, DomTree, Node, NodeId};
use html5ever::tendril::TendrilSink;
use html5ever::{ns, parse_document, LocalName, QualName};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// HTML5 parser
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Document {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a base URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Document {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default()).one(html);

        let mut document = Document::empty(url);
        let tree = document.tree_mut();
        let root = tree.root();
        for child in dom.document.children.borrow().iter() {
            self.convert_node(child, tree, Some(root));
        }
        document.finalize();

        tracing::debug!("Parsed {} nodes", document.tree().len());
        document
    }

    /// Parse a body-level fragment into `tree`.
    ///
    /// The returned nodes are detached and in source order; the caller
    /// decides where they go.
    pub fn parse_fragment(&self, html: &str, tree: &mut DomTree) -> Vec<NodeId> {
        self.parse_fragment_in(html, "body", tree)
    }

    /// Parse a fragment as the children of a `context` element.
    ///
    /// The context picks the insertion mode, so `<tr>` survives under a
    /// `tbody` or `template` context and is dropped under `div`.
    pub fn parse_fragment_in(&self, html: &str, context: &str, tree: &mut DomTree) -> Vec<NodeId> {
        let context_name = QualName::new(None, ns!(html), LocalName::from(context.to_ascii_lowercase()));
        let dom = html5ever::parse_fragment(
            RcDom::default(),
            Default::default(),
            context_name,
            Vec::new(),
            false,
        )
        .one(html);

        let Some(root) = find_element(&dom.document, "html") else {
            return Vec::new();
        };

        root.children.borrow()
            .iter()
            .filter_map(|child| self.convert_node(child, tree, None))
            .collect()
    }

    /// Convert an RcDom node (and its subtree) to our DOM format
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: Option<NodeId>) -> Option<NodeId> {
        let id = match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, parent);
                }
                return None;
            }
            RcNodeData::Doctype { name, public_id, system_id } => {
                tree.create_doctype(name, public_id, system_id)
            }
            RcNodeData::Text { contents } => tree.create_text(&contents.borrow()),
            RcNodeData::Comment { contents } => tree.create_comment(contents),
            RcNodeData::Element { name, attrs, .. } => {
                let id = tree.create_element(&name.local);
                if let Some(elem) = tree.get_mut(id).and_then(Node::as_element_mut) {
                    for attr in attrs.borrow().iter() {
                        elem.set_attr(&attr.name.local, &attr.value);
                    }
                }
                id
            }
            RcNodeData::ProcessingInstruction { .. } => return None,
        };

        if let Some(parent) = parent {
            if let Err(err) = tree.append_child(parent, id) {
                tracing::warn!("Dropping parsed node {}: {}", id, err);
                return None;
            }
        }

        for child in handle.children.borrow().iter() {
            self.convert_node(child, tree, Some(id));
        }
        Some(id)
    }
}

/// First element child of `handle` with the given local name
fn find_element(handle: &Handle, local: &str) -> Option<Handle> {
    handle.children.borrow()
        .iter()
        .find(|child| matches!(&child.data, RcNodeData::Element { name, .. } if &*name.local == local))
        .cloned()
}
