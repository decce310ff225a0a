//! Static host styling.
//!
//! - [`TAttributes`] - Declared host attributes, classes and styles
//! - [`compute_static_styling`] - Class/style buckets cached on a node
//! - [`set_up_attributes`], [`write_direct_class`], [`write_direct_style`] -
//!   The three renderer writes, in the order bootstrap issues them

mod attrs;
mod static_styling;

pub use attrs::*;
pub use static_styling::*;

use crate::renderer::{RElement, Renderer};

/// Overwrite the class attribute of `element` with the static classes.
pub fn write_direct_class(renderer: &dyn Renderer, element: &RElement, classes: &str) {
    renderer.write_class(element, classes);
}

/// Overwrite the style attribute of `element` with the static styles.
pub fn write_direct_style(renderer: &dyn Renderer, element: &RElement, styles: &str) {
    renderer.write_style(element, styles);
}
