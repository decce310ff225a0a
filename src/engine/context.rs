//! Context Discovery - Back-references from components to their views.
//!
//! Every root component is associated with the root view hosting it and the
//! index of its host node. The association is weak in both directions: it
//! never keeps a view alive, and it is dropped when the component is
//! destroyed.
//!
//! ```text
//! component ──(weak)──► root view ──slot[host]──► component view
//!                           │
//!                           └── context ──► root context
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::root_context::RootContext;
use crate::types::{instance_key, ComponentInstance};
use super::view::{ViewRecord, ViewRef};

struct PatchedView {
    view: Weak<RefCell<ViewRecord>>,
    node_index: usize,
}

thread_local! {
    /// Component identity -> hosting view.
    static PATCH_DATA: RefCell<HashMap<usize, PatchedView>> = RefCell::new(HashMap::new());
}

/// Associate `instance` with the view hosting it at `node_index`.
///
/// Entries whose view has been dropped are pruned first.
pub fn attach_patch_data(instance: &ComponentInstance, view: &ViewRef, node_index: usize) {
    PATCH_DATA.with(|data| {
        let mut data = data.borrow_mut();
        data.retain(|_, patched| patched.view.strong_count() > 0);
        data.insert(
            instance_key(instance),
            PatchedView {
                view: Rc::downgrade(view),
                node_index,
            },
        );
    })
}

pub fn detach_patch_data(instance: &ComponentInstance) {
    PATCH_DATA.with(|data| {
        data.borrow_mut().remove(&instance_key(instance));
    })
}

/// The view hosting `instance` and the index of its host node.
pub fn read_patched_view(instance: &ComponentInstance) -> Option<(ViewRef, usize)> {
    PATCH_DATA.with(|data| {
        let data = data.borrow();
        let patched = data.get(&instance_key(instance))?;
        Some((patched.view.upgrade()?, patched.node_index))
    })
}

/// The component's own view.
pub fn get_component_view_by_instance(instance: &ComponentInstance) -> Option<ViewRef> {
    let (host_view, node_index) = read_patched_view(instance)?;
    let component_view = host_view.borrow().child_view(node_index);
    component_view
}

/// Walk parents up to the synthetic root view.
pub fn get_root_view(view: &ViewRef) -> Option<ViewRef> {
    let mut current = view.clone();
    loop {
        if current.borrow().is_root() {
            return Some(current);
        }
        let parent = current.borrow().parent()?;
        current = parent;
    }
}

/// Root context owning `instance`.
pub fn get_root_context(instance: &ComponentInstance) -> Option<Rc<RootContext>> {
    let (host_view, _) = read_patched_view(instance)?;
    let root_view = get_root_view(&host_view)?;
    let root_context = root_view.borrow().root_context();
    root_context
}

// =============================================================================
// Reset (for testing)
// =============================================================================

pub fn reset_patch_data() {
    PATCH_DATA.with(|data| data.borrow_mut().clear());
}

/// Number of tracked component associations.
pub fn patch_data_len() -> usize {
    PATCH_DATA.with(|data| data.borrow().len())
}
