//! Core types for spark-view.
//!
//! These types define the foundation that everything builds on.
//! They flow through view assembly, the instruction state and the scheduler.

use std::any::Any;
use std::rc::Rc;

// =============================================================================
// Component Instances
// =============================================================================

/// A live component instance.
///
/// Instances are type-erased so views, root contexts and injectors can hold
/// components of any type. Use [`downcast_component`] to get the concrete
/// type back.
pub type ComponentInstance = Rc<dyn Any>;

/// Recover the concrete type of a component instance.
pub fn downcast_component<T: 'static>(instance: &ComponentInstance) -> Option<Rc<T>> {
    instance.clone().downcast::<T>().ok()
}

/// Identity key of an instance (its allocation address).
#[inline]
pub(crate) fn instance_key(instance: &ComponentInstance) -> usize {
    Rc::as_ptr(instance) as *const () as usize
}

// =============================================================================
// View Layout
// =============================================================================

/// Index of the first declaration slot in every view record.
///
/// Slots below this index form the view header (static descriptor, parent,
/// flags, host, renderer, sanitizer, injector, context). Node and directive
/// indices are always absolute, i.e. `>= HEADER_OFFSET`.
pub const HEADER_OFFSET: usize = 8;

/// Tag given to the synthetic node that represents a root component's host.
///
/// The real tag name is never read from the host element.
pub const HOST_TAG: &str = "#host";

/// How a component participates in change detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangeDetection {
    /// Checked on every change-detection pass.
    #[default]
    Default,
    /// Checked only when marked dirty.
    OnPush,
}

// =============================================================================
// Flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// State of a single view record.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ViewFlags: u16 {
        /// The view has not finished its creation pass yet.
        const CREATION_MODE = 1 << 0;
        /// The view has not finished its first update pass (init hooks pending).
        const FIRST_VIEW_PASS = 1 << 1;
        /// The view needs to be checked on the next pass (on-push views).
        const DIRTY = 1 << 2;
        /// Participates in every change-detection pass unconditionally.
        const CHECK_ALWAYS = 1 << 3;
        /// The view is attached to the change-detection tree.
        const ATTACHED = 1 << 4;
        /// The view has been torn down.
        const DESTROYED = 1 << 5;
        /// Synthetic root view; its context is the root context.
        const IS_ROOT = 1 << 6;
    }
}

bitflags::bitflags! {
    /// Work pending on a root context.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RootContextFlags: u8 {
        const EMPTY = 0;
        /// A change-detection pass is scheduled.
        const DETECT_CHANGES = 1 << 0;
        /// An animation player flush is scheduled.
        const FLUSH_PLAYERS = 1 << 1;
    }
}

bitflags::bitflags! {
    /// Mode a template, host-binding or content-query function runs in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RenderFlags: u8 {
        const CREATE = 1 << 0;
        const UPDATE = 1 << 1;
    }
}

bitflags::bitflags! {
    /// Static flags of a node descriptor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u8 {
        /// At least one directive is attached to the node.
        const IS_DIRECTIVE_HOST = 1 << 0;
        /// The node hosts a component.
        const IS_COMPONENT_HOST = 1 << 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        value: u32,
    }

    #[test]
    fn test_downcast_component() {
        let instance: ComponentInstance = Rc::new(Counter { value: 3 });
        let counter = downcast_component::<Counter>(&instance).unwrap();
        assert_eq!(counter.value, 3);
        assert!(downcast_component::<String>(&instance).is_none());
    }

    #[test]
    fn test_instance_key_is_identity() {
        let a: ComponentInstance = Rc::new(Counter { value: 1 });
        let b: ComponentInstance = Rc::new(Counter { value: 1 });
        assert_eq!(instance_key(&a), instance_key(&a.clone()));
        assert_ne!(instance_key(&a), instance_key(&b));
    }

    #[test]
    fn test_root_context_flags_empty() {
        assert!(RootContextFlags::EMPTY.is_empty());
        let flags = RootContextFlags::DETECT_CHANGES | RootContextFlags::FLUSH_PLAYERS;
        assert!(flags.contains(RootContextFlags::FLUSH_PLAYERS));
    }
}
