//! fOS DOM - Document Object Model
//!
//! Arena-based DOM tree with attribute mutation observers.
//!
//! Nodes live in a single `Vec` owned by [`DomTree`] and link to each other
//! through [`NodeId`] handles. Detached nodes stay in the arena until
//! [`DomTree::drop_subtree`] frees them; freed slots are reused under a new
//! generation, so a stale `NodeId` resolves to nothing instead of a
//! different node.

mod node;
mod tree;
mod document;
mod classlist;
mod observer;
mod operations;
mod serializer;

pub use node::{Node, NodeData, ElementData, TextData, Attribute};
pub use tree::{DomTree, Children};
pub use document::Document;
pub use classlist::ClassList;
pub use observer::{MutationObserverInit, MutationRecord, ObserverId, ObserverRegistry};
pub use operations::{DomError, DomResult};
pub use serializer::HtmlSerializer;

/// Node identifier (generational index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId::new(0, 0);

    /// Sentinel for "no node" in sibling/parent links
    pub const NONE: NodeId = NodeId::new(u32::MAX, 0);

    #[inline]
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Check if this ID refers to a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena slot
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// How many times the slot was freed before this node took it
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }

    /// Convert a link into an `Option`
    #[inline]
    pub fn to_option(self) -> Option<NodeId> {
        self.is_valid().then_some(self)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.is_valid(), self.generation) {
            (false, _) => write!(f, "#none"),
            (true, 0) => write!(f, "#{}", self.index),
            (true, g) => write!(f, "#{}v{}", self.index, g),
        }
    }
}
