//! Node Descriptor - Static metadata of one node in a view.

use crate::di::Token;
use crate::styling::TAttributes;
use crate::types::{NodeFlags, HOST_TAG};

/// Per-node static metadata, finalized during the first creation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDescriptor {
    /// Absolute slot index of the node in its view.
    pub index: usize,
    /// Tag name, or [`HOST_TAG`] for a synthetic root host.
    pub tag: String,
    pub flags: NodeFlags,
    /// Static attributes merged from the component's host metadata.
    pub merged_attrs: Option<TAttributes>,
    /// Static classes, deduplicated in declaration order.
    pub class_list: Vec<String>,
    /// `class_list` joined for a direct class write.
    pub classes: Option<String>,
    /// Static styles; a later declaration wins per property.
    pub style_map: Vec<(String, String)>,
    /// `style_map` rendered for a direct style write.
    pub styles: Option<String>,
    /// First directive slot attached to this node.
    pub directive_start: usize,
    /// One past the last directive slot.
    pub directive_end: usize,
    /// Set once a node injector exists for this node.
    pub injector_index: Option<usize>,
    /// Types made resolvable through the node injector.
    pub published: Vec<Token>,
}

impl NodeDescriptor {
    pub fn new(index: usize, tag: &str) -> Self {
        Self {
            index,
            tag: tag.to_string(),
            flags: NodeFlags::empty(),
            merged_attrs: None,
            class_list: Vec::new(),
            classes: None,
            style_map: Vec::new(),
            styles: None,
            directive_start: 0,
            directive_end: 0,
            injector_index: None,
            published: Vec::new(),
        }
    }

    pub fn is_synthetic_host(&self) -> bool {
        self.tag == HOST_TAG
    }

    pub fn is_component_host(&self) -> bool {
        self.flags.contains(NodeFlags::IS_COMPONENT_HOST)
    }

    pub fn directive_range(&self) -> std::ops::Range<usize> {
        self.directive_start..self.directive_end
    }
}
