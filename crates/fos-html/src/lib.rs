//! fOS HTML Parser
//!
//! HTML5 parsing built on html5ever. Documents and template fragments are
//! converted into `fos-dom` trees.

mod parser;

pub use parser::HtmlParser;
pub use fos_dom::{Document, DomTree, NodeId};

/// Parse an HTML string into a Document
pub fn parse(html: &str) -> Document {
    HtmlParser::new().parse(html)
}

/// Parse an HTML fragment into `tree`, returning the detached top-level nodes
pub fn parse_fragment(html: &str, tree: &mut DomTree) -> Vec<NodeId> {
    HtmlParser::new().parse_fragment(html, tree)
}

/// Parse an HTML fragment as the content of a `context` element
pub fn parse_fragment_in(html: &str, context: &str, tree: &mut DomTree) -> Vec<NodeId> {
    HtmlParser::new().parse_fragment_in(html, context, tree)
}
