//! Static attribute lists.
//!
//! A component declares its host attributes once. The list keeps plain
//! attributes, namespaced attributes, classes and styles apart so the
//! renderer can write each bucket through the right primitive.

use crate::renderer::{RElement, Renderer};

/// One entry of a static attribute list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrEntry {
    Attr { name: String, value: String },
    Namespaced { namespace: String, name: String, value: String },
    Class(String),
    Style { property: String, value: String },
}

/// Ordered static attributes of a host node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TAttributes {
    entries: Vec<AttrEntry>,
}

impl TAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw `name = value` host pairs.
    ///
    /// `class` is split on whitespace and `style` is parsed into
    /// declarations; everything else stays a plain attribute.
    pub fn from_host(pairs: &[(&str, &str)]) -> Self {
        pairs.iter().fold(Self::new(), |attrs, (name, value)| match *name {
            "class" => value.split_whitespace().fold(attrs, |attrs, class| attrs.class(class)),
            "style" => crate::renderer::dom::parse_style(value)
                .into_iter()
                .fold(attrs, |attrs, (prop, value)| attrs.style(&prop, &value)),
            _ => attrs.attr(name, value),
        })
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.entries.push(AttrEntry::Attr {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn namespaced(mut self, namespace: &str, name: &str, value: &str) -> Self {
        self.entries.push(AttrEntry::Namespaced {
            namespace: namespace.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn class(mut self, name: &str) -> Self {
        self.entries.push(AttrEntry::Class(name.to_string()));
        self
    }

    pub fn style(mut self, property: &str, value: &str) -> Self {
        self.entries.push(AttrEntry::Style {
            property: property.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn entries(&self) -> &[AttrEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|entry| match entry {
            AttrEntry::Class(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn styles(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|entry| match entry {
            AttrEntry::Style { property, value } => Some((property.as_str(), value.as_str())),
            _ => None,
        })
    }
}

/// Write the plain and namespaced attributes of `attrs` onto `native`.
///
/// Classes and styles are skipped; they go through
/// [`write_direct_class`](super::write_direct_class) and
/// [`write_direct_style`](super::write_direct_style) afterwards.
/// Returns the number of attributes written.
pub fn set_up_attributes(renderer: &dyn Renderer, native: &RElement, attrs: &TAttributes) -> usize {
    let mut written = 0;
    for entry in attrs.entries() {
        match entry {
            AttrEntry::Attr { name, value } => {
                renderer.set_attribute(native, name, value, None);
                written += 1;
            }
            AttrEntry::Namespaced { namespace, name, value } => {
                renderer.set_attribute(native, name, value, Some(namespace));
                written += 1;
            }
            AttrEntry::Class(_) | AttrEntry::Style { .. } => {}
        }
    }
    written
}
