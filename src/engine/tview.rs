//! Static View Descriptor - Per-type shape of a view.
//!
//! One descriptor exists per component type (plus one root host descriptor
//! per bootstrapped type). It is mutable only while its one-shot
//! first-creation-pass flag is set:
//!
//! ```text
//! new() ──► edit() / edit() / ... ──► freeze() ──► read() only
//!           (first creation pass)
//! ```
//!
//! Node descriptors, directive entries and host-binding op-codes are all
//! finalized during that pass.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::types::HEADER_OFFSET;
use super::def::{ComponentDef, HostBindingsFn, TemplateFn};
use super::tnode::NodeDescriptor;

// =============================================================================
// Descriptor Data
// =============================================================================

/// What a descriptor describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind {
    /// Synthetic root holding a single host slot.
    Root,
    /// A component's own template view.
    Component,
}

/// Static entry of one declaration slot.
#[derive(Clone)]
pub enum TData {
    Empty,
    Node(NodeDescriptor),
    Directive(Rc<ComponentDef>),
}

/// Host-binding program entry.
#[derive(Clone)]
pub enum HostBindingOpCode {
    /// Make the node at this index the rendering target.
    Select(usize),
    /// Run `host_bindings` against the directive stored at `directive_index`.
    Bind {
        directive_index: usize,
        binding_root: usize,
        host_bindings: HostBindingsFn,
    },
}

/// The mutable contents of a descriptor.
#[derive(Clone, Default)]
pub struct TViewData {
    data: Vec<TData>,
    pub host_binding_op_codes: Vec<HostBindingOpCode>,
    /// Indices of nodes hosting a component, in registration order.
    pub components: Vec<usize>,
}

impl TViewData {
    fn offset(index: usize) -> usize {
        debug_assert!(index >= HEADER_OFFSET, "index {index} points into the view header");
        index - HEADER_OFFSET
    }

    /// Absolute length a view created from this descriptor starts with.
    pub fn len(&self) -> usize {
        HEADER_OFFSET + self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TData> {
        self.data.get(Self::offset(index))
    }

    pub fn set(&mut self, index: usize, entry: TData) {
        let offset = Self::offset(index);
        if offset >= self.data.len() {
            self.data.resize(offset + 1, TData::Empty);
        }
        self.data[offset] = entry;
    }

    /// Append an entry, returning its absolute index.
    pub fn push(&mut self, entry: TData) -> usize {
        self.data.push(entry);
        self.len() - 1
    }

    pub fn node(&self, index: usize) -> Option<&NodeDescriptor> {
        match self.get(index) {
            Some(TData::Node(node)) => Some(node),
            _ => None,
        }
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut NodeDescriptor> {
        match self.data.get_mut(Self::offset(index)) {
            Some(TData::Node(node)) => Some(node),
            _ => None,
        }
    }

    pub fn directive(&self, index: usize) -> Option<&Rc<ComponentDef>> {
        match self.get(index) {
            Some(TData::Directive(def)) => Some(def),
            _ => None,
        }
    }
}

// =============================================================================
// Static View Descriptor
// =============================================================================

pub struct StaticViewDescriptor {
    kind: DescriptorKind,
    template: Option<TemplateFn>,
    first_create_pass: Cell<bool>,
    data: RefCell<TViewData>,
}

impl StaticViewDescriptor {
    /// Create a descriptor with `decls` empty declaration slots.
    pub fn new(kind: DescriptorKind, decls: usize, template: Option<TemplateFn>) -> Rc<Self> {
        let data = TViewData {
            data: vec![TData::Empty; decls],
            ..Default::default()
        };
        Rc::new(Self {
            kind,
            template,
            first_create_pass: Cell::new(true),
            data: RefCell::new(data),
        })
    }

    pub fn kind(&self) -> DescriptorKind {
        self.kind
    }

    pub fn template(&self) -> Option<&TemplateFn> {
        self.template.as_ref()
    }

    pub fn is_first_create_pass(&self) -> bool {
        self.first_create_pass.get()
    }

    /// Absolute length of a fresh view built from this descriptor.
    pub fn blueprint_len(&self) -> usize {
        self.data.borrow().len()
    }

    pub fn read<R>(&self, f: impl FnOnce(&TViewData) -> R) -> R {
        f(&self.data.borrow())
    }

    /// Mutate the descriptor. Only valid during the first creation pass.
    pub fn edit<R>(&self, f: impl FnOnce(&mut TViewData) -> R) -> R {
        debug_assert!(
            self.first_create_pass.get(),
            "static view descriptor is frozen"
        );
        f(&mut self.data.borrow_mut())
    }

    /// End the first creation pass. Returns `true` if this call did it.
    pub fn freeze(&self) -> bool {
        self.first_create_pass.replace(false)
    }
}
