//! Change Detection - Creation and update passes over the view tree.
//!
//! A creation pass ([`render_view`]) runs each template once in create
//! mode and freezes the static descriptors. An update pass
//! ([`refresh_view`]) runs, per view:
//!
//! 1. the template in update mode
//! 2. content hooks (init on the first pass, then checked)
//! 3. the host-binding program
//! 4. child components that are check-always or dirty
//! 5. view hooks (init on the first pass, then checked)

use std::rc::Rc;

use tracing::{debug, trace};

use crate::root_context::RootContext;
use crate::scheduler::schedule_tick;
use crate::types::{ComponentInstance, RenderFlags, RootContextFlags, ViewFlags};
use super::context::{get_component_view_by_instance, get_root_context, get_root_view, read_patched_view};
use super::hooks::execute_init_and_check_hooks;
use super::shared::process_host_binding_op_codes;
use super::state::{enter_view, leave_view};
use super::view::ViewRef;

// =============================================================================
// Passes
// =============================================================================

/// Run the creation pass of `view` and its child components.
pub fn render_view(view: &ViewRef) {
    let (tview, component) = {
        let view = view.borrow();
        (view.tview().clone(), view.component().cloned())
    };

    enter_view(view);
    if let (Some(template), Some(component)) = (tview.template().cloned(), component) {
        template(RenderFlags::CREATE, &component);
    }
    if tview.freeze() {
        trace!(kind = ?tview.kind(), "static view descriptor frozen");
    }

    let components = tview.read(|data| data.components.clone());
    for index in components {
        let child = view.borrow().child_view(index);
        if let Some(child) = child {
            if child.borrow().flags().contains(ViewFlags::CREATION_MODE) {
                render_view(&child);
            }
        }
    }

    view.borrow_mut().remove_flags(ViewFlags::CREATION_MODE);
    leave_view();
}

/// Run the update pass of `view` and every child component that needs it.
pub fn refresh_view(view: &ViewRef) {
    let (tview, flags, component) = {
        let view = view.borrow();
        (view.tview().clone(), view.flags(), view.component().cloned())
    };
    if flags.contains(ViewFlags::DESTROYED) {
        return;
    }
    let first_pass = flags.contains(ViewFlags::FIRST_VIEW_PASS);

    enter_view(view);
    if let (Some(template), Some(component)) = (tview.template().cloned(), component) {
        template(RenderFlags::UPDATE, &component);
    }

    execute_init_and_check_hooks(view, first_pass, |hooks| {
        (hooks.content.clone(), hooks.content_checked.clone())
    });

    process_host_binding_op_codes(&tview, view);

    let components = tview.read(|data| data.components.clone());
    for index in components {
        let child = view.borrow().child_view(index);
        if let Some(child) = child {
            refresh_component(&child);
        }
    }

    execute_init_and_check_hooks(view, first_pass, |hooks| {
        (hooks.view.clone(), hooks.view_checked.clone())
    });

    view.borrow_mut()
        .remove_flags(ViewFlags::FIRST_VIEW_PASS | ViewFlags::DIRTY);
    leave_view();
}

fn refresh_component(view: &ViewRef) {
    let flags = view.borrow().flags();
    let needs_check = flags.intersects(ViewFlags::CHECK_ALWAYS | ViewFlags::DIRTY);
    if needs_check && flags.contains(ViewFlags::ATTACHED) && !flags.contains(ViewFlags::DESTROYED) {
        refresh_view(view);
    }
}

/// Refresh a root view, finishing its creation pass first if needed.
///
/// The pass is bracketed by the renderer factory's `begin` and `end`.
pub fn render_component_or_template(root_view: &ViewRef) {
    let (renderer_factory, creation_mode) = {
        let view = root_view.borrow();
        (
            view.renderer_factory().clone(),
            view.flags().contains(ViewFlags::CREATION_MODE),
        )
    };
    renderer_factory.begin();
    if creation_mode {
        render_view(root_view);
    }
    refresh_view(root_view);
    renderer_factory.end();
}

/// Refresh the root view of every component registered on `root_context`.
///
/// A root view shared by several components is refreshed once.
pub fn tick_root_context(root_context: &RootContext) {
    let mut refreshed: Vec<ViewRef> = Vec::new();
    for component in root_context.components() {
        let Some((host_view, _)) = read_patched_view(&component) else {
            continue;
        };
        let Some(root_view) = get_root_view(&host_view) else {
            continue;
        };
        if refreshed.iter().any(|seen| Rc::ptr_eq(seen, &root_view)) {
            continue;
        }
        render_component_or_template(&root_view);
        refreshed.push(root_view);
    }
    debug!(roots = refreshed.len(), "root context ticked");
}

// =============================================================================
// Dirty Marking
// =============================================================================

/// Mark `view` and its ancestors dirty up to the root view.
///
/// Returns the root view, or None if the chain is broken.
pub fn mark_view_dirty(view: &ViewRef) -> Option<ViewRef> {
    let mut current = view.clone();
    loop {
        current.borrow_mut().insert_flags(ViewFlags::DIRTY);
        if current.borrow().is_root() {
            return Some(current);
        }
        let parent = current.borrow().parent()?;
        current = parent;
    }
}

/// Mark `component` dirty and schedule a change-detection flush on its root.
///
/// Returns false when the component is not a bootstrapped root component.
pub fn mark_dirty(component: &ComponentInstance) -> bool {
    let Some(view) = get_component_view_by_instance(component) else {
        return false;
    };
    let Some(root_view) = mark_view_dirty(&view) else {
        return false;
    };
    let Some(root_context) = root_view.borrow().root_context() else {
        return false;
    };
    schedule_tick(&root_context, RootContextFlags::DETECT_CHANGES);
    true
}

/// Synchronously run change detection over `component`'s root.
///
/// Returns false when the component is not a bootstrapped root component.
pub fn detect_changes(component: &ComponentInstance) -> bool {
    let Some(root_context) = get_root_context(component) else {
        return false;
    };
    tick_root_context(&root_context);
    true
}
