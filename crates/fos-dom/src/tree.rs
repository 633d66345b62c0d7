//! DOM Tree (arena-based allocation)
//!
//! Core node manipulation: appendChild, insertBefore, removeChild, attribute
//! access. Attribute writes are reported to the tree's observer registry.

use crate::{
    Attribute, ClassList, DomError, DomResult, ElementData, HtmlSerializer, MutationObserverInit,
    MutationRecord, Node, NodeId, ObserverId, ObserverRegistry,
};

/// One arena cell; `node` is `None` while the slot sits on the free list
#[derive(Debug)]
struct Slot {
    node: Option<Node>,
    generation: u32,
}

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    observers: ObserverRegistry,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            slots: vec![Slot { node: Some(Node::document()), generation: 0 }],
            free: Vec::new(),
            live: 1,
            observers: ObserverRegistry::new(),
        }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID; `None` once the node has been dropped
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_ref())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_mut())
    }

    /// Number of live nodes, detached ones included
    pub fn len(&self) -> usize {
        self.live
    }

    /// Always false: the document node is created with the tree
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Arena size, free slots included
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.get_mut(id).ok_or(DomError::NotFound(id))
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot { node: Some(node), generation: 0 });
        NodeId::new(index, 0)
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content.to_string()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push(Node::comment(content.to_string()))
    }

    /// Create a detached doctype node
    pub fn create_doctype(&mut self, name: &str, public_id: &str, system_id: &str) -> NodeId {
        self.push(Node::doctype(name.to_string(), public_id.to_string(), system_id.to_string()))
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent.to_option())
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.first_child.to_option())
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.last_child.to_option())
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling.to_option())
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling.to_option())
    }

    /// Iterate over the direct children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.first_child(id).unwrap_or(NodeId::NONE),
        }
    }

    /// Snapshot of child IDs, safe to hold across mutations
    pub fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).map(|(child, _)| child).collect()
    }

    /// Element children only
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .filter(|(_, node)| node.is_element())
            .map(|(child, _)| child)
            .collect()
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Whether the node is attached under the document root
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.get(id).is_some() && self.contains(NodeId::ROOT, id)
    }

    /// All descendants in document (pre-)order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.child_ids(id).into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.child_ids(current).into_iter().rev());
        }
        out
    }

    /// Elements under `root` carrying attribute `name`, in document order.
    ///
    /// Equivalent to `root.querySelectorAll("[name]")`.
    pub fn elements_with_attribute(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.element(id).is_some_and(|e| e.has_attr(name)))
            .collect()
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.get(id).and_then(Node::as_text) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|d| self.get(d).and_then(Node::as_text))
            .collect()
    }

    // ------------------------------------------------------------------
    // Structure mutation
    // ------------------------------------------------------------------

    fn check_insert(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;
        if !parent_node.is_container()
            || matches!(child_node.data, crate::NodeData::Document)
            || self.contains(child, parent)
        {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    /// Unlink a node from its parent and siblings, if it has a parent
    fn unlink(&mut self, id: NodeId) -> DomResult<()> {
        let (parent, prev, next) = {
            let node = self.node(id)?;
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return Ok(());
        }

        if prev.is_valid() {
            self.node_mut(prev)?.next_sibling = next;
        } else {
            self.node_mut(parent)?.first_child = next;
        }
        if next.is_valid() {
            self.node_mut(next)?.prev_sibling = prev;
        } else {
            self.node_mut(parent)?.last_child = prev;
        }

        let node = self.node_mut(id)?;
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
        Ok(())
    }

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (or at the end when `None`)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<NodeId> {
        self.check_insert(parent, child)?;
        if let Some(reference) = reference {
            if self.node(reference)?.parent != parent {
                return Err(DomError::NotAChild { parent, child: reference });
            }
            if reference == child {
                return Ok(child);
            }
        }

        self.unlink(child)?;

        let (prev, next) = match reference {
            Some(reference) => (self.node(reference)?.prev_sibling, reference),
            None => (self.node(parent)?.last_child, NodeId::NONE),
        };

        {
            let node = self.node_mut(child)?;
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = next;
        }
        if prev.is_valid() {
            self.node_mut(prev)?.next_sibling = child;
        } else {
            self.node_mut(parent)?.first_child = child;
        }
        if next.is_valid() {
            self.node_mut(next)?.prev_sibling = child;
        } else {
            self.node_mut(parent)?.last_child = child;
        }
        Ok(child)
    }

    /// Insert `child` immediately after `reference`, under the same parent
    pub fn insert_after(&mut self, reference: NodeId, child: NodeId) -> DomResult<NodeId> {
        let parent = self.parent(reference).ok_or(DomError::NotFound(reference))?;
        let next = self.next_sibling(reference);
        self.insert_before(parent, child, next)
    }

    /// Remove `child` from `parent`; the node stays in the arena until dropped
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        if self.node(child)?.parent != parent {
            return Err(DomError::NotAChild { parent, child });
        }
        self.unlink(child)?;
        Ok(child)
    }

    /// Detach a node from wherever it is
    pub fn detach(&mut self, id: NodeId) -> DomResult<()> {
        self.unlink(id)
    }

    /// Remove every child of `id` (innerHTML = ''), returning them
    pub fn remove_children(&mut self, id: NodeId) -> DomResult<Vec<NodeId>> {
        let children = self.child_ids(id);
        for &child in &children {
            self.unlink(child)?;
        }
        Ok(children)
    }

    /// Detach `id` and free it together with all its descendants.
    ///
    /// Returns the number of nodes freed. Their slots are reused by later
    /// creations, and the dropped ids stop resolving.
    pub fn drop_subtree(&mut self, id: NodeId) -> DomResult<usize> {
        if id == NodeId::ROOT {
            return Err(DomError::DocumentDrop(id));
        }
        self.node(id)?;
        self.unlink(id)?;

        let mut dropped = self.descendants(id);
        dropped.push(id);
        for &gone in &dropped {
            let slot = &mut self.slots[gone.index()];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(gone.index() as u32);
        }
        self.live -= dropped.len();
        self.observers.forget(&dropped);
        Ok(dropped.len())
    }

    /// Remove and free every child of `id`
    pub fn clear_children(&mut self, id: NodeId) -> DomResult<usize> {
        let mut freed = 0;
        for child in self.child_ids(id) {
            freed += self.drop_subtree(child)?;
        }
        Ok(freed)
    }

    /// Move every child of `from` to the end of `to`, keeping order
    pub fn move_children(&mut self, from: NodeId, to: NodeId) -> DomResult<()> {
        for child in self.child_ids(from) {
            self.append_child(to, child)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    /// Element data of a node
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    /// Tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.get_attr(name))
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_attr(name))
    }

    /// Attributes of an element (empty for other nodes)
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        self.element(id).map(ElementData::attrs).unwrap_or(&[])
    }

    /// Set an attribute and queue a mutation record for observers
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        let elem = self.node_mut(id)?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))?;
        let old = elem.set_attr(name, value);
        self.observers.queue_attribute(id, name, old.as_deref());
        Ok(())
    }

    /// Remove an attribute; observers hear about it only if it existed
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<Option<String>> {
        let elem = self.node_mut(id)?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))?;
        let old = elem.remove_attr(name);
        if old.is_some() {
            self.observers.queue_attribute(id, name, old.as_deref());
        }
        Ok(old)
    }

    /// The `id` attribute, if present and non-empty
    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.element(id).and_then(ElementData::id)
    }

    /// Parsed class list (empty for non-elements)
    pub fn class_list(&self, id: NodeId) -> ClassList {
        self.element(id).map(ElementData::class_list).unwrap_or_default()
    }

    /// Write a class list back to the `class` attribute
    pub fn set_class_list(&mut self, id: NodeId, classes: &ClassList) -> DomResult<()> {
        self.set_attribute(id, "class", &classes.value())
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    /// Observe a node for attribute changes
    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) -> ObserverId {
        self.observers.observe(target, options)
    }

    /// Drain queued records of one observer
    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers.take_records(observer)
    }

    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    pub fn observers_mut(&mut self) -> &mut ObserverRegistry {
        &mut self.observers
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------

    /// innerHTML of a node
    pub fn inner_html(&self, id: NodeId) -> String {
        HtmlSerializer::new().serialize_inner(self, id)
    }

    /// outerHTML of a node
    pub fn outer_html(&self, id: NodeId) -> String {
        HtmlSerializer::new().serialize_outer(self, id)
    }
}

/// Iterator over the children of a node
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.to_option()?;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}
