//! In-memory host elements and the default renderer.
//!
//! Elements keep their attributes in write order. Classes and inline styles
//! live in the `class` and `style` attributes like they would on a real
//! document, so the renderer and tests can observe exactly what was written.

use std::cell::RefCell;
use std::rc::Rc;

use crate::engine::ComponentDef;
use super::{RElement, Renderer, RendererFactory};

// =============================================================================
// Element
// =============================================================================

/// A single attribute on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomAttribute {
    pub name: String,
    pub value: String,
    pub namespace: Option<String>,
}

/// An in-memory host element.
#[derive(Debug)]
pub struct Element {
    tag: String,
    namespace: Option<String>,
    attributes: RefCell<Vec<DomAttribute>>,
}

impl Element {
    /// Create a detached element.
    pub fn new(tag: &str) -> RElement {
        Self::new_ns(tag, None)
    }

    pub fn new_ns(tag: &str, namespace: Option<&str>) -> RElement {
        Rc::new(Self {
            tag: tag.to_string(),
            namespace: namespace.map(str::to_string),
            attributes: RefCell::new(Vec::new()),
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Value of a non-namespaced attribute.
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes
            .borrow()
            .iter()
            .find(|attr| attr.name == name && attr.namespace.is_none())
            .map(|attr| attr.value.clone())
    }

    /// Snapshot of every attribute in write order.
    pub fn attributes(&self) -> Vec<DomAttribute> {
        self.attributes.borrow().clone()
    }

    /// Set an attribute, replacing an existing one with the same name and namespace.
    pub fn set_attribute(&self, name: &str, value: &str, namespace: Option<&str>) {
        let mut attributes = self.attributes.borrow_mut();
        let existing = attributes
            .iter_mut()
            .find(|attr| attr.name == name && attr.namespace.as_deref() == namespace);
        match existing {
            Some(attr) => attr.value = value.to_string(),
            None => attributes.push(DomAttribute {
                name: name.to_string(),
                value: value.to_string(),
                namespace: namespace.map(str::to_string),
            }),
        }
    }

    /// The raw `class` attribute ("" when unset).
    pub fn class_name(&self) -> String {
        self.attribute("class").unwrap_or_default()
    }

    pub fn class_list(&self) -> Vec<String> {
        self.class_name().split_whitespace().map(str::to_string).collect()
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.class_list().iter().any(|class| class == name)
    }

    pub fn add_class(&self, name: &str) {
        let mut classes = self.class_list();
        if !classes.iter().any(|class| class == name) {
            classes.push(name.to_string());
            self.set_attribute("class", &classes.join(" "), None);
        }
    }

    /// The raw `style` attribute ("" when unset).
    pub fn style_text(&self) -> String {
        self.attribute("style").unwrap_or_default()
    }

    /// Value of one inline style property.
    pub fn style(&self, property: &str) -> Option<String> {
        parse_style(&self.style_text())
            .into_iter()
            .find(|(prop, _)| prop == property)
            .map(|(_, value)| value)
    }

    pub fn set_style(&self, property: &str, value: &str) {
        let mut styles = parse_style(&self.style_text());
        match styles.iter_mut().find(|(prop, _)| prop == property) {
            Some(entry) => entry.1 = value.to_string(),
            None => styles.push((property.to_string(), value.to_string())),
        }
        let text = styles
            .iter()
            .map(|(prop, value)| format!("{prop}: {value};"))
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attribute("style", &text, None);
    }
}

/// Split `"color: red; width: 10px;"` into property/value pairs.
pub(crate) fn parse_style(text: &str) -> Vec<(String, String)> {
    text.split(';')
        .filter_map(|declaration| {
            let (prop, value) = declaration.split_once(':')?;
            let prop = prop.trim();
            if prop.is_empty() {
                return None;
            }
            Some((prop.to_string(), value.trim().to_string()))
        })
        .collect()
}

// =============================================================================
// Document
// =============================================================================

/// The set of attached elements a renderer can select from.
#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: Rc<RefCell<Vec<RElement>>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an element so selectors can find it.
    pub fn append(&self, element: RElement) {
        self.elements.borrow_mut().push(element);
    }

    /// First attached element matching `selector`.
    ///
    /// Supports `#id` and bare tag selectors.
    pub fn query(&self, selector: &str) -> Option<RElement> {
        let selector = selector.trim();
        self.elements
            .borrow()
            .iter()
            .find(|element| match selector.strip_prefix('#') {
                Some(id) => element.attribute("id").as_deref() == Some(id),
                None => element.tag() == selector,
            })
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.borrow().is_empty()
    }
}

// =============================================================================
// Renderer
// =============================================================================

/// Renderer writing straight into in-memory elements.
#[derive(Debug, Clone, Default)]
pub struct DomRenderer {
    document: Document,
}

impl DomRenderer {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl Renderer for DomRenderer {
    fn create_element(&self, name: &str, namespace: Option<&str>) -> RElement {
        Element::new_ns(name, namespace)
    }

    fn select_root_element(&self, selector: &str) -> Option<RElement> {
        self.document.query(selector)
    }

    fn set_attribute(&self, element: &RElement, name: &str, value: &str, namespace: Option<&str>) {
        element.set_attribute(name, value, namespace);
    }

    fn add_class(&self, element: &RElement, name: &str) {
        element.add_class(name);
    }

    fn set_style(&self, element: &RElement, property: &str, value: &str) {
        element.set_style(property, value);
    }

    fn write_class(&self, element: &RElement, value: &str) {
        element.set_attribute("class", value, None);
    }

    fn write_style(&self, element: &RElement, value: &str) {
        element.set_attribute("style", value, None);
    }
}

/// Default renderer factory. Every renderer shares the factory's document.
#[derive(Debug, Clone, Default)]
pub struct DomRendererFactory {
    document: Document,
}

impl DomRendererFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: Document) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl RendererFactory for DomRendererFactory {
    fn create_renderer(&self, _host: Option<&RElement>, _def: Option<&ComponentDef>) -> Rc<dyn Renderer> {
        Rc::new(DomRenderer::new(self.document.clone()))
    }
}
