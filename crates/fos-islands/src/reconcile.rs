//! DOM reconciliation
//!
//! Puts a freshly rendered component root in place of, or inside, its host
//! element.
//!
//! ```text
//! Replace, first mount:   <a/><host/><b/>  ->  <a/><rendered/><b/>
//!                         (id, classes, marker and prop attributes merged)
//! Replace, re-render:     host.children  <-  rendered.children
//! Append, first mount:    host.children += rendered
//! Append, re-render:      host.children  =  [rendered]
//! ```
//!
//! Whatever leaves the document here is freed from the arena: the replaced
//! host, old content on re-render, the emptied render shell, the placeholder.

use fos_dom::{DomResult, DomTree, NodeId};

use crate::codec;
use crate::config::AttributeNames;

/// Where rendered output goes relative to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Swap the host for the rendered root
    Replace,
    /// Nest the rendered root inside the host
    Append,
}

/// Which reconciliation pass is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    FirstMount,
    Rerender,
}

/// Text of the placeholder comment used while swapping nodes
const PLACEHOLDER: &str = "fos-islands";

/// Place `rendered` for the host and return the node that is the host from
/// now on (`rendered` after a first Replace mount, `host` otherwise).
pub fn place(
    tree: &mut DomTree,
    host: NodeId,
    rendered: NodeId,
    placement: Placement,
    pass: Pass,
    component: &str,
    names: &AttributeNames,
) -> DomResult<NodeId> {
    match (placement, pass) {
        (Placement::Append, Pass::FirstMount) => {
            tree.append_child(host, rendered)?;
            Ok(host)
        }
        (Placement::Append, Pass::Rerender) => {
            tree.clear_children(host)?;
            tree.append_child(host, rendered)?;
            Ok(host)
        }
        (Placement::Replace, Pass::FirstMount) => replace_host(tree, host, rendered, component, names),
        (Placement::Replace, Pass::Rerender) => {
            // Content only: the settled host keeps its own attributes.
            tree.clear_children(host)?;
            tree.move_children(rendered, host)?;
            tree.drop_subtree(rendered)?;
            Ok(host)
        }
    }
}

fn replace_host(
    tree: &mut DomTree,
    host: NodeId,
    rendered: NodeId,
    component: &str,
    names: &AttributeNames,
) -> DomResult<NodeId> {
    let host_id = tree.element_id(host).map(str::to_string);
    let host_classes = tree.class_list(host);
    let managed = codec::managed_attributes(&names.prop, tree, host);

    if tree.element_id(rendered).is_none() {
        if let Some(id) = host_id {
            tree.set_attribute(rendered, "id", &id)?;
        }
    }

    let mut classes = tree.class_list(rendered);
    if classes.is_empty() && !host_classes.is_empty() {
        for class in host_classes.iter() {
            classes.add(class);
        }
        tree.set_class_list(rendered, &classes)?;
    }

    tree.set_attribute(rendered, &names.marker, component)?;
    for (name, value) in &managed {
        tree.set_attribute(rendered, name, value)?;
    }

    let Some(parent) = tree.parent(host) else {
        tracing::debug!("[fos-islands] Host {} is detached, leaving {} unplaced", host, rendered);
        return Ok(rendered);
    };

    // The placeholder pins the slot while the host leaves the tree.
    let placeholder = tree.create_comment(PLACEHOLDER);
    tree.insert_before(parent, placeholder, Some(host))?;
    tree.remove_child(parent, host)?;
    tree.insert_after(placeholder, rendered)?;
    tree.drop_subtree(placeholder)?;
    tree.drop_subtree(host)?;

    Ok(rendered)
}
