//! Lifecycle Hooks - Post-order hook registration and dispatch.
//!
//! Hook lists live on the view record, so two roots sharing a static
//! descriptor dispatch hooks independently.

use std::rc::Rc;

use super::def::{HookFn, LifecycleHooks};
use super::view::ViewRef;

/// A lifecycle hook registered for the directive at `directive_index`.
#[derive(Clone)]
pub struct HookEntry {
    pub directive_index: usize,
    pub hook: HookFn,
}

/// Post-order hooks dispatched by one view.
#[derive(Clone, Default)]
pub struct PostOrderHooks {
    pub content: Vec<HookEntry>,
    pub content_checked: Vec<HookEntry>,
    pub view: Vec<HookEntry>,
    pub view_checked: Vec<HookEntry>,
    pub destroy: Vec<HookEntry>,
}

impl PostOrderHooks {
    /// Append every hook `hooks` declares for the directive at `directive_index`.
    pub fn register(&mut self, directive_index: usize, hooks: &LifecycleHooks) {
        let lists = [
            (&hooks.after_content_init, &mut self.content),
            (&hooks.after_content_checked, &mut self.content_checked),
            (&hooks.after_view_init, &mut self.view),
            (&hooks.after_view_checked, &mut self.view_checked),
            (&hooks.on_destroy, &mut self.destroy),
        ];
        for (hook, list) in lists {
            if let Some(hook) = hook {
                list.push(HookEntry {
                    directive_index,
                    hook: Rc::clone(hook),
                });
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
            && self.content_checked.is_empty()
            && self.view.is_empty()
            && self.view_checked.is_empty()
            && self.destroy.is_empty()
    }
}

/// Register the post-order hooks of every directive on the node at
/// `node_index` with `view`.
pub fn register_post_order_hooks(view: &ViewRef, node_index: usize) {
    let tview = view.borrow().tview().clone();
    let directives = tview.read(|data| {
        let range = data.node(node_index).map(|node| node.directive_range());
        debug_assert!(range.is_some(), "no node descriptor at {node_index}");
        range
            .into_iter()
            .flatten()
            .filter_map(|index| data.directive(index).map(|def| (index, def.clone())))
            .collect::<Vec<_>>()
    });

    let mut view = view.borrow_mut();
    for (directive_index, def) in directives {
        view.hooks_mut().register(directive_index, def.hooks());
    }
}

/// Call `hooks` against the directive instances stored in `view`.
pub fn call_hooks(view: &ViewRef, hooks: &[HookEntry]) {
    for entry in hooks {
        let directive = view.borrow().directive(entry.directive_index);
        if let Some(directive) = directive {
            (entry.hook)(&directive);
        }
    }
}

/// Init hooks on the first update pass, then the matching check hooks.
pub fn execute_init_and_check_hooks(
    view: &ViewRef,
    first_pass: bool,
    select: impl Fn(&PostOrderHooks) -> (Vec<HookEntry>, Vec<HookEntry>),
) {
    let (init_hooks, check_hooks) = select(view.borrow().hooks());
    if first_pass {
        call_hooks(view, &init_hooks);
    }
    call_hooks(view, &check_hooks);
}

pub fn execute_destroy_hooks(view: &ViewRef) {
    let hooks = view.borrow().hooks().destroy.clone();
    call_hooks(view, &hooks);
}
