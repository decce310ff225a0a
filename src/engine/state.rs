//! Instruction State - The view currently being created or refreshed.
//!
//! Bootstrap and refresh run synchronously on one thread. Entering a view
//! pushes a frame; the frame tracks the node under construction and the
//! selected rendering target. Frames nest when a refresh descends into
//! child component views.

use std::cell::RefCell;

use super::view::ViewRef;

struct Frame {
    view: ViewRef,
    current_node: Option<usize>,
    selected_index: Option<usize>,
}

thread_local! {
    /// Stack of entered views, innermost last.
    static FRAMES: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

// =============================================================================
// Enter / Leave
// =============================================================================

pub fn enter_view(view: &ViewRef) {
    FRAMES.with(|frames| {
        frames.borrow_mut().push(Frame {
            view: view.clone(),
            current_node: None,
            selected_index: None,
        });
    })
}

pub fn leave_view() {
    FRAMES.with(|frames| {
        let left = frames.borrow_mut().pop();
        debug_assert!(left.is_some(), "leave_view without a matching enter_view");
    })
}

/// The innermost entered view.
pub fn get_view() -> Option<ViewRef> {
    FRAMES.with(|frames| frames.borrow().last().map(|frame| frame.view.clone()))
}

// =============================================================================
// Current Node / Selection
// =============================================================================

pub fn get_current_node() -> Option<usize> {
    FRAMES.with(|frames| frames.borrow().last().and_then(|frame| frame.current_node))
}

pub fn set_current_node(index: usize) {
    FRAMES.with(|frames| {
        let mut frames = frames.borrow_mut();
        debug_assert!(!frames.is_empty(), "no view entered");
        if let Some(frame) = frames.last_mut() {
            frame.current_node = Some(index);
        }
    })
}

pub fn get_selected_index() -> Option<usize> {
    FRAMES.with(|frames| frames.borrow().last().and_then(|frame| frame.selected_index))
}

pub fn set_selected_index(index: usize) {
    FRAMES.with(|frames| {
        if let Some(frame) = frames.borrow_mut().last_mut() {
            frame.selected_index = Some(index);
        }
    })
}

/// Number of entered views.
pub fn depth() -> usize {
    FRAMES.with(|frames| frames.borrow().len())
}

// =============================================================================
// Reset (for testing)
// =============================================================================

pub fn reset_state() {
    FRAMES.with(|frames| frames.borrow_mut().clear());
}
