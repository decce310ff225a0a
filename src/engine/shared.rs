//! Shared Instructions - Building blocks of view creation.
//!
//! Every function that writes to a static descriptor only does so during
//! that descriptor's first creation pass; later passes read what the first
//! one recorded.

use std::rc::Rc;

use tracing::trace;

use crate::di::get_node_injectable;
use crate::error::{RenderError, Result};
use crate::types::{ComponentInstance, NodeFlags, RenderFlags};
use super::context::attach_patch_data;
use super::def::ComponentDef;
use super::state::{get_current_node, set_current_node, set_selected_index};
use super::tnode::NodeDescriptor;
use super::tview::{HostBindingOpCode, StaticViewDescriptor, TData};
use super::view::ViewRef;

// =============================================================================
// Nodes
// =============================================================================

/// Return the node at `index`, creating it during the first creation pass.
///
/// The node becomes the current node of the entered view.
pub fn get_or_create_tnode(tview: &StaticViewDescriptor, index: usize, tag: &str) -> usize {
    let exists = tview.read(|data| data.node(index).is_some());
    if !exists {
        tview.edit(|data| data.set(index, TData::Node(NodeDescriptor::new(index, tag))));
    }
    set_current_node(index);
    index
}

/// Flag the node as a component host and remember it for child refreshes.
pub fn mark_as_component_host(tview: &StaticViewDescriptor, node_index: usize) {
    tview.edit(|data| {
        if let Some(node) = data.node_mut(node_index) {
            node.flags.insert(NodeFlags::IS_COMPONENT_HOST);
        }
        data.components.push(node_index);
    });
}

/// Set the node's directive range to `[directive_start, directive_start + count)`.
pub fn init_tnode_flags(tview: &StaticViewDescriptor, node_index: usize, directive_start: usize, count: usize) {
    tview.edit(|data| {
        let node = data.node_mut(node_index);
        debug_assert!(node.is_some(), "no node descriptor at {node_index}");
        if let Some(node) = node {
            node.flags.insert(NodeFlags::IS_DIRECTIVE_HOST);
            node.directive_start = directive_start;
            node.directive_end = directive_start + count;
        }
    });
}

// =============================================================================
// View Tree
// =============================================================================

/// Append `child` to `parent`'s traversal list. Order is creation order.
pub fn add_to_view_tree(parent: &ViewRef, child: &ViewRef) {
    parent.borrow_mut().push_child(child.clone());
}

/// Grow the view (and, on the first pass, its descriptor) by `count` slots.
///
/// Returns the absolute index of the first new slot.
pub fn alloc_expando(tview: &StaticViewDescriptor, view: &ViewRef, count: usize) -> usize {
    let start = view.borrow().len();
    for _ in 0..count {
        if tview.is_first_create_pass() {
            tview.edit(|data| data.push(TData::Empty));
        }
        view.borrow_mut().push_slot();
    }
    start
}

// =============================================================================
// Root Component Instantiation
// =============================================================================

/// Instantiate the component attached to the current node of `view`.
///
/// On the first creation pass the component's directive slot is allocated
/// and registered; later passes reuse the slot from the blueprint.
pub fn instantiate_root_component(
    tview: &StaticViewDescriptor,
    view: &ViewRef,
    def: &Rc<ComponentDef>,
) -> Result<ComponentInstance> {
    let node_index = get_current_node();
    debug_assert!(node_index.is_some(), "root node should have been created");
    let node_index = node_index.ok_or(RenderError::NoCurrentNode)?;

    if tview.is_first_create_pass() {
        let directive_index = alloc_expando(tview, view, 1);
        tview.edit(|data| data.set(directive_index, TData::Directive(def.clone())));
    }

    let directive_start = tview.read(|data| data.node(node_index).map(|node| node.directive_start));
    debug_assert!(directive_start.is_some(), "no node descriptor at {node_index}");
    let directive_start = directive_start.ok_or(RenderError::NoCurrentNode)?;
    let directive = get_node_injectable(view, directive_start, node_index)?;
    attach_patch_data(&directive, view, node_index);
    Ok(directive)
}

// =============================================================================
// Host Bindings
// =============================================================================

/// Append `def`'s host-binding program for the node at `node_index`.
///
/// Nothing is emitted when the definition has no host bindings.
pub fn register_host_binding_op_codes(
    tview: &StaticViewDescriptor,
    node_index: usize,
    directive_index: usize,
    binding_root: usize,
    def: &ComponentDef,
) {
    let Some(host_bindings) = def.host_bindings() else {
        return;
    };
    trace!(component = def.type_name(), node_index, "registering host binding op-codes");
    tview.edit(|data| {
        let codes = &mut data.host_binding_op_codes;
        let last_selected = codes.iter().rev().find_map(|code| match code {
            HostBindingOpCode::Select(index) => Some(*index),
            HostBindingOpCode::Bind { .. } => None,
        });
        if last_selected != Some(node_index) {
            codes.push(HostBindingOpCode::Select(node_index));
        }
        codes.push(HostBindingOpCode::Bind {
            directive_index,
            binding_root,
            host_bindings: host_bindings.clone(),
        });
    });
}

pub fn invoke_host_bindings_in_creation_mode(def: &ComponentDef, directive: &ComponentInstance) {
    if let Some(host_bindings) = def.host_bindings() {
        host_bindings(RenderFlags::CREATE, directive);
    }
}

/// Run the registered host-binding program in update mode.
pub fn process_host_binding_op_codes(tview: &StaticViewDescriptor, view: &ViewRef) {
    let codes = tview.read(|data| data.host_binding_op_codes.clone());
    for code in codes {
        match code {
            HostBindingOpCode::Select(index) => set_selected_index(index),
            HostBindingOpCode::Bind {
                directive_index,
                host_bindings,
                ..
            } => {
                let directive = view.borrow().directive(directive_index);
                if let Some(directive) = directive {
                    host_bindings(RenderFlags::UPDATE, &directive);
                }
            }
        }
    }
}
