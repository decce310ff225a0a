//! Renderer - Host mutation contract.
//!
//! The view runtime never touches host elements directly. Every attribute,
//! class and style write goes through a [`Renderer`], and every component
//! subtree gets its own renderer from a [`RendererFactory`].
//!
//! - [`Renderer`] - Primitive writes on a host element, applied in call order
//! - [`RendererFactory`] - Creates renderers scoped to a host and component type
//! - [`dom`] - In-memory element tree and the default renderer over it

pub mod dom;

use std::rc::Rc;

use crate::engine::ComponentDef;

pub use dom::{Document, DomAttribute, DomRenderer, DomRendererFactory, Element};

/// Handle to a host render element.
pub type RElement = Rc<Element>;

// =============================================================================
// Renderer
// =============================================================================

/// Primitive host operations.
///
/// Implementations must apply writes in call order.
pub trait Renderer {
    /// Create a detached element.
    fn create_element(&self, name: &str, namespace: Option<&str>) -> RElement;

    /// Find an existing element to bootstrap into.
    fn select_root_element(&self, selector: &str) -> Option<RElement>;

    /// Set a plain (optionally namespaced) attribute.
    fn set_attribute(&self, element: &RElement, name: &str, value: &str, namespace: Option<&str>);

    /// Add a single class, keeping the ones already present.
    fn add_class(&self, element: &RElement, name: &str);

    /// Set a single style property.
    fn set_style(&self, element: &RElement, property: &str, value: &str);

    /// Overwrite the whole class attribute with `value`.
    fn write_class(&self, element: &RElement, value: &str);

    /// Overwrite the whole style attribute with `value`.
    fn write_style(&self, element: &RElement, value: &str);
}

// =============================================================================
// Renderer Factory
// =============================================================================

/// Creates renderers for component subtrees.
///
/// `create_renderer` must not leak state from one call into the next.
pub trait RendererFactory {
    fn create_renderer(&self, host: Option<&RElement>, def: Option<&ComponentDef>) -> Rc<dyn Renderer>;

    /// Called before a bootstrap or change-detection pass writes anything.
    fn begin(&self) {}

    /// Called after a bootstrap or change-detection pass is done.
    fn end(&self) {}
}
