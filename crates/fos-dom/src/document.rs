//! Document - High-level document API

use crate::{DomTree, NodeId};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    tree: DomTree,
    /// Document URL
    url: String,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
}

impl Document {
    /// Create a new document with an html/head/body skeleton
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Fresh detached elements under a container cannot fail to insert.
        let _ = tree.append_child(tree.root(), html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
        }
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
        }
    }

    /// Locate html/head/body after the tree was filled by a parser
    pub fn finalize(&mut self) {
        self.html_element = self.tree.element_children(self.tree.root())
            .into_iter()
            .find(|&id| self.tree.tag_name(id) == Some("html"))
            .unwrap_or(NodeId::NONE);

        if !self.html_element.is_valid() {
            return;
        }
        for id in self.tree.element_children(self.html_element) {
            match self.tree.tag_name(id) {
                Some("head") => self.head_element = id,
                Some("body") => self.body_element = id,
                _ => {}
            }
        }
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get document title
    pub fn title(&self) -> String {
        if !self.head_element.is_valid() {
            return String::new();
        }
        self.tree.element_children(self.head_element)
            .into_iter()
            .find(|&id| self.tree.tag_name(id) == Some("title"))
            .map(|id| self.tree.text_content(id))
            .unwrap_or_default()
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.descendants(self.tree.root())
            .into_iter()
            .find(|&node| self.tree.element_id(node) == Some(id))
    }

    /// All connected elements carrying attribute `name`
    pub fn query_attribute_all(&self, name: &str) -> Vec<NodeId> {
        self.tree.elements_with_attribute(self.tree.root(), name)
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
