//! View Record - One instantiated view.
//!
//! A view record holds a fixed header (static descriptor, parent, flags,
//! host, renderer, sanitizer, injector, context) followed by declaration
//! slots starting at [`HEADER_OFFSET`]:
//!
//! ```text
//! [ header .................. ][ HEADER_OFFSET      ][ HEADER_OFFSET + 1 ]
//!   tview parent flags ...      host element / view   component instance
//! ```
//!
//! Parents are weak back-references; a view owns its children only through
//! its slots and its view-tree list.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::di::Injector;
use crate::renderer::{RElement, Renderer, RendererFactory};
use crate::root_context::RootContext;
use crate::sanitization::{SecurityContext, Sanitizer};
use crate::types::{ComponentInstance, ViewFlags, HEADER_OFFSET};
use super::hooks::PostOrderHooks;
use super::tview::StaticViewDescriptor;

/// Shared handle to a view record.
pub type ViewRef = Rc<RefCell<ViewRecord>>;

/// What a view renders for.
#[derive(Clone, Default)]
pub enum ViewContext {
    #[default]
    None,
    /// The component instance of a component view.
    Component(ComponentInstance),
    /// The root context of a synthetic root view.
    Root(Rc<RootContext>),
}

/// Contents of one declaration slot.
#[derive(Clone, Default)]
pub enum Slot {
    #[default]
    Empty,
    /// A raw host element.
    Element(RElement),
    /// A child view stored at its host node.
    View(ViewRef),
    /// An instantiated directive or component.
    Directive(ComponentInstance),
    /// A directive whose factory is currently running.
    Pending,
}

pub struct ViewRecord {
    tview: Rc<StaticViewDescriptor>,
    parent: Option<Weak<RefCell<ViewRecord>>>,
    flags: ViewFlags,
    host: Option<RElement>,
    t_host: Option<usize>,
    renderer_factory: Rc<dyn RendererFactory>,
    renderer: Rc<dyn Renderer>,
    sanitizer: Option<Rc<dyn Sanitizer>>,
    injector: Option<Rc<dyn Injector>>,
    context: ViewContext,
    hooks: PostOrderHooks,
    children: Vec<ViewRef>,
    slots: Vec<Slot>,
}

impl ViewRecord {
    /// Allocate a view over `tview` with its blueprint's slot count.
    ///
    /// The view starts in creation mode, attached, before its first update pass.
    pub fn new(
        tview: Rc<StaticViewDescriptor>,
        parent: Option<&ViewRef>,
        flags: ViewFlags,
        renderer_factory: Rc<dyn RendererFactory>,
        renderer: Rc<dyn Renderer>,
    ) -> Self {
        let slot_count = tview.blueprint_len() - HEADER_OFFSET;
        Self {
            tview,
            parent: parent.map(Rc::downgrade),
            flags: flags | ViewFlags::CREATION_MODE | ViewFlags::FIRST_VIEW_PASS | ViewFlags::ATTACHED,
            host: None,
            t_host: None,
            renderer_factory,
            renderer,
            sanitizer: None,
            injector: None,
            context: ViewContext::None,
            hooks: PostOrderHooks::default(),
            children: Vec::new(),
            slots: vec![Slot::Empty; slot_count],
        }
    }

    pub fn with_host(mut self, host: Option<RElement>, t_host: Option<usize>) -> Self {
        self.host = host;
        self.t_host = t_host;
        self
    }

    pub fn with_sanitizer(mut self, sanitizer: Option<Rc<dyn Sanitizer>>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    pub fn with_injector(mut self, injector: Option<Rc<dyn Injector>>) -> Self {
        self.injector = injector;
        self
    }

    pub fn with_context(mut self, context: ViewContext) -> Self {
        self.context = context;
        self
    }

    pub fn into_ref(self) -> ViewRef {
        Rc::new(RefCell::new(self))
    }

    // -------------------------------------------------------------------------
    // Header
    // -------------------------------------------------------------------------

    pub fn tview(&self) -> &Rc<StaticViewDescriptor> {
        &self.tview
    }

    pub fn parent(&self) -> Option<ViewRef> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    pub fn flags(&self) -> ViewFlags {
        self.flags
    }

    pub fn insert_flags(&mut self, flags: ViewFlags) {
        self.flags.insert(flags);
    }

    pub fn remove_flags(&mut self, flags: ViewFlags) {
        self.flags.remove(flags);
    }

    pub fn is_root(&self) -> bool {
        self.flags.contains(ViewFlags::IS_ROOT)
    }

    pub fn host(&self) -> Option<&RElement> {
        self.host.as_ref()
    }

    /// Index of the node hosting this view in its parent.
    pub fn t_host(&self) -> Option<usize> {
        self.t_host
    }

    pub fn renderer_factory(&self) -> &Rc<dyn RendererFactory> {
        &self.renderer_factory
    }

    pub fn renderer(&self) -> &Rc<dyn Renderer> {
        &self.renderer
    }

    pub fn sanitizer(&self) -> Option<&Rc<dyn Sanitizer>> {
        self.sanitizer.as_ref()
    }

    /// Run `value` through the view's sanitizer, if it has one.
    pub fn sanitize(&self, context: SecurityContext, value: &str) -> Option<String> {
        match &self.sanitizer {
            Some(sanitizer) => sanitizer.sanitize(context, value),
            None => Some(value.to_string()),
        }
    }

    pub fn injector(&self) -> Option<&Rc<dyn Injector>> {
        self.injector.as_ref()
    }

    pub fn context(&self) -> &ViewContext {
        &self.context
    }

    /// Assign the context. A view's context is assigned exactly once.
    pub fn set_context(&mut self, context: ViewContext) {
        debug_assert!(
            matches!(self.context, ViewContext::None),
            "view context is already assigned"
        );
        self.context = context;
    }

    pub fn component(&self) -> Option<&ComponentInstance> {
        match &self.context {
            ViewContext::Component(component) => Some(component),
            _ => None,
        }
    }

    pub fn root_context(&self) -> Option<Rc<RootContext>> {
        match &self.context {
            ViewContext::Root(root_context) => Some(root_context.clone()),
            _ => None,
        }
    }

    /// Post-order hooks this view dispatches during change detection.
    pub fn hooks(&self) -> &PostOrderHooks {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut PostOrderHooks {
        &mut self.hooks
    }

    // -------------------------------------------------------------------------
    // View Tree
    // -------------------------------------------------------------------------

    pub fn children(&self) -> &[ViewRef] {
        &self.children
    }

    pub(crate) fn push_child(&mut self, child: ViewRef) {
        self.children.push(child);
    }

    // -------------------------------------------------------------------------
    // Slots
    // -------------------------------------------------------------------------

    /// Absolute length (header included).
    pub fn len(&self) -> usize {
        HEADER_OFFSET + self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        debug_assert!(index >= HEADER_OFFSET, "index {index} points into the view header");
        self.slots.get(index - HEADER_OFFSET)
    }

    pub fn set_slot(&mut self, index: usize, slot: Slot) {
        debug_assert!(index >= HEADER_OFFSET && index < self.len(), "slot index {index} out of range");
        self.slots[index - HEADER_OFFSET] = slot;
    }

    /// Append an empty slot, returning its absolute index.
    pub fn push_slot(&mut self) -> usize {
        self.slots.push(Slot::Empty);
        self.len() - 1
    }

    /// The directive instance stored at `index`, if it has been created.
    pub fn directive(&self, index: usize) -> Option<ComponentInstance> {
        match self.slot(index) {
            Some(Slot::Directive(instance)) => Some(instance.clone()),
            _ => None,
        }
    }

    /// The child view stored at `index`.
    pub fn child_view(&self, index: usize) -> Option<ViewRef> {
        match self.slot(index) {
            Some(Slot::View(view)) => Some(view.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tview::DescriptorKind;
    use crate::renderer::{DomRenderer, DomRendererFactory};

    struct Upper;

    impl Sanitizer for Upper {
        fn sanitize(&self, _context: SecurityContext, value: &str) -> Option<String> {
            Some(value.to_uppercase())
        }
    }

    fn root_view() -> ViewRecord {
        ViewRecord::new(
            StaticViewDescriptor::new(DescriptorKind::Root, 1, None),
            None,
            ViewFlags::IS_ROOT | ViewFlags::CHECK_ALWAYS,
            Rc::new(DomRendererFactory::new()),
            Rc::new(DomRenderer::default()),
        )
    }

    #[test]
    fn test_new_view_flags_and_len() {
        let view = root_view();
        assert!(view.is_root());
        assert!(view.flags().contains(ViewFlags::CREATION_MODE | ViewFlags::ATTACHED));
        assert_eq!(view.len(), HEADER_OFFSET + 1);
        assert!(matches!(view.slot(HEADER_OFFSET), Some(Slot::Empty)));
    }

    #[test]
    fn test_push_slot() {
        let mut view = root_view();
        assert_eq!(view.push_slot(), HEADER_OFFSET + 1);
        assert_eq!(view.len(), HEADER_OFFSET + 2);
    }

    #[test]
    fn test_parent_is_weak() {
        let parent = root_view().into_ref();
        let child = ViewRecord::new(
            StaticViewDescriptor::new(DescriptorKind::Component, 0, None),
            Some(&parent),
            ViewFlags::CHECK_ALWAYS,
            Rc::new(DomRendererFactory::new()),
            Rc::new(DomRenderer::default()),
        );
        assert!(Rc::ptr_eq(&child.parent().unwrap(), &parent));
        drop(parent);
        assert!(child.parent().is_none());
    }

    #[test]
    fn test_sanitize() {
        let view = root_view();
        assert_eq!(view.sanitize(SecurityContext::Html, "a"), Some("a".to_string()));

        let view = root_view().with_sanitizer(Some(Rc::new(Upper)));
        assert_eq!(view.sanitize(SecurityContext::Html, "a"), Some("A".to_string()));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "already assigned")]
    fn test_context_assigned_once() {
        let mut view = root_view();
        view.set_context(ViewContext::Component(Rc::new(1u8)));
        view.set_context(ViewContext::Component(Rc::new(2u8)));
    }
}
