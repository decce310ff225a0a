//! Test doubles shared by the unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use crate::engine::ComponentDef;
use crate::renderer::{Document, DomRenderer, RElement, Renderer, RendererFactory};

/// One call observed by a [`RecordingRendererFactory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererOp {
    CreateRenderer {
        has_host: bool,
        component: Option<String>,
    },
    SetAttribute {
        name: String,
        value: String,
    },
    AddClass(String),
    SetStyle {
        property: String,
        value: String,
    },
    WriteClass(String),
    WriteStyle(String),
    Begin,
    End,
}

impl RendererOp {
    fn is_write(&self) -> bool {
        matches!(
            self,
            Self::SetAttribute { .. }
                | Self::AddClass(_)
                | Self::SetStyle { .. }
                | Self::WriteClass(_)
                | Self::WriteStyle(_)
        )
    }
}

type OpLog = Rc<RefCell<Vec<RendererOp>>>;

/// Renderer factory logging every call in order.
///
/// Writes are applied to the elements too, through a [`DomRenderer`].
#[derive(Default)]
pub struct RecordingRendererFactory {
    log: OpLog,
    document: Document,
}

impl RecordingRendererFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: Document) -> Self {
        Self {
            log: OpLog::default(),
            document,
        }
    }

    pub fn ops(&self) -> Vec<RendererOp> {
        self.log.borrow().clone()
    }

    /// Only the element writes, in order.
    pub fn writes(&self) -> Vec<RendererOp> {
        self.log.borrow().iter().filter(|op| op.is_write()).cloned().collect()
    }

    pub fn renderers_created(&self) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|op| matches!(op, RendererOp::CreateRenderer { .. }))
            .count()
    }
}

impl RendererFactory for RecordingRendererFactory {
    fn create_renderer(&self, host: Option<&RElement>, def: Option<&ComponentDef>) -> Rc<dyn Renderer> {
        self.log.borrow_mut().push(RendererOp::CreateRenderer {
            has_host: host.is_some(),
            component: def.map(|def| def.selector().to_string()),
        });
        Rc::new(RecordingRenderer {
            log: self.log.clone(),
            inner: DomRenderer::new(self.document.clone()),
        })
    }

    fn begin(&self) {
        self.log.borrow_mut().push(RendererOp::Begin);
    }

    fn end(&self) {
        self.log.borrow_mut().push(RendererOp::End);
    }
}

struct RecordingRenderer {
    log: OpLog,
    inner: DomRenderer,
}

impl Renderer for RecordingRenderer {
    fn create_element(&self, name: &str, namespace: Option<&str>) -> RElement {
        self.inner.create_element(name, namespace)
    }

    fn select_root_element(&self, selector: &str) -> Option<RElement> {
        self.inner.select_root_element(selector)
    }

    fn set_attribute(&self, element: &RElement, name: &str, value: &str, namespace: Option<&str>) {
        self.log.borrow_mut().push(RendererOp::SetAttribute {
            name: name.to_string(),
            value: value.to_string(),
        });
        self.inner.set_attribute(element, name, value, namespace);
    }

    fn add_class(&self, element: &RElement, name: &str) {
        self.log.borrow_mut().push(RendererOp::AddClass(name.to_string()));
        self.inner.add_class(element, name);
    }

    fn set_style(&self, element: &RElement, property: &str, value: &str) {
        self.log.borrow_mut().push(RendererOp::SetStyle {
            property: property.to_string(),
            value: value.to_string(),
        });
        self.inner.set_style(element, property, value);
    }

    fn write_class(&self, element: &RElement, value: &str) {
        self.log.borrow_mut().push(RendererOp::WriteClass(value.to_string()));
        self.inner.write_class(element, value);
    }

    fn write_style(&self, element: &RElement, value: &str) {
        self.log.borrow_mut().push(RendererOp::WriteStyle(value.to_string()));
        self.inner.write_style(element, value);
    }
}

/// Fails the test if anything asks it for a renderer.
pub struct PanickingRendererFactory;

impl RendererFactory for PanickingRendererFactory {
    fn create_renderer(&self, _host: Option<&RElement>, _def: Option<&ComponentDef>) -> Rc<dyn Renderer> {
        panic!("renderer requested from the wrong injector");
    }
}
