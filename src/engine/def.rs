//! Component Definition - Static metadata of a component type.
//!
//! A definition is built once per component type and shared behind an `Rc`.
//! It carries the factory, the optional template/host-binding/content-query
//! functions and lifecycle hooks, and caches the type's static view
//! descriptors after they are first created.
//!
//! # Example
//!
//! ```ignore
//! use spark_view::engine::ComponentDef;
//! use spark_view::styling::TAttributes;
//!
//! struct Counter { clicks: Cell<u32> }
//!
//! let def = ComponentDef::builder("app-counter", |_injector| {
//!         Ok(Counter { clicks: Cell::new(0) })
//!     })
//!     .host_attrs(TAttributes::from_host(&[("class", "counter")]))
//!     .host_bindings(|rf, counter: &Counter| { /* ... */ })
//!     .after_view_init(|counter: &Counter| { /* ... */ })
//!     .build();
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::di::{Injector, Token};
use crate::error::Result;
use crate::styling::TAttributes;
use crate::types::{ChangeDetection, ComponentInstance, RenderFlags};
use super::tview::{DescriptorKind, StaticViewDescriptor};

// =============================================================================
// Erased Function Types
// =============================================================================

pub type ComponentFactoryFn = Rc<dyn Fn(&dyn Injector) -> Result<ComponentInstance>>;
pub type TemplateFn = Rc<dyn Fn(RenderFlags, &ComponentInstance)>;
pub type HostBindingsFn = Rc<dyn Fn(RenderFlags, &ComponentInstance)>;
/// Called with the render mode, the instance and the directive index.
pub type ContentQueriesFn = Rc<dyn Fn(RenderFlags, &ComponentInstance, usize)>;
pub type HookFn = Rc<dyn Fn(&ComponentInstance)>;

/// Post-order lifecycle hooks a component can declare.
#[derive(Clone, Default)]
pub struct LifecycleHooks {
    pub after_content_init: Option<HookFn>,
    pub after_content_checked: Option<HookFn>,
    pub after_view_init: Option<HookFn>,
    pub after_view_checked: Option<HookFn>,
    pub on_destroy: Option<HookFn>,
}

// =============================================================================
// Component Definition
// =============================================================================

pub struct ComponentDef {
    token: Token,
    selector: String,
    host_attrs: Option<TAttributes>,
    change_detection: ChangeDetection,
    decls: usize,
    factory: ComponentFactoryFn,
    template: Option<TemplateFn>,
    host_bindings: Option<HostBindingsFn>,
    content_queries: Option<ContentQueriesFn>,
    hooks: LifecycleHooks,
    tview: RefCell<Option<Rc<StaticViewDescriptor>>>,
    root_tview: RefCell<Option<Rc<StaticViewDescriptor>>>,
}

impl ComponentDef {
    /// Start a definition for component type `T`.
    pub fn builder<T: 'static>(
        selector: &str,
        factory: impl Fn(&dyn Injector) -> Result<T> + 'static,
    ) -> ComponentDefBuilder<T> {
        ComponentDefBuilder::new(selector, factory)
    }

    /// Token the component type is published under.
    pub fn token(&self) -> Token {
        self.token
    }

    pub fn type_name(&self) -> &'static str {
        self.token.name()
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Element name used when bootstrap has to create the host itself.
    pub fn tag_name(&self) -> &str {
        self.selector
            .split(|c: char| c == '[' || c == '.' || c == ',' || c.is_whitespace())
            .next()
            .filter(|tag| !tag.is_empty())
            .unwrap_or("div")
    }

    pub fn host_attrs(&self) -> Option<&TAttributes> {
        self.host_attrs.as_ref()
    }

    pub fn change_detection(&self) -> ChangeDetection {
        self.change_detection
    }

    pub fn is_on_push(&self) -> bool {
        self.change_detection == ChangeDetection::OnPush
    }

    pub fn decls(&self) -> usize {
        self.decls
    }

    pub fn template(&self) -> Option<&TemplateFn> {
        self.template.as_ref()
    }

    pub fn host_bindings(&self) -> Option<&HostBindingsFn> {
        self.host_bindings.as_ref()
    }

    pub fn content_queries(&self) -> Option<&ContentQueriesFn> {
        self.content_queries.as_ref()
    }

    pub fn hooks(&self) -> &LifecycleHooks {
        &self.hooks
    }

    /// Run the factory.
    pub fn create(&self, injector: &dyn Injector) -> Result<ComponentInstance> {
        (self.factory)(injector)
    }

    /// The component's own view descriptor, created on first use.
    pub fn component_tview(&self) -> Rc<StaticViewDescriptor> {
        self.tview
            .borrow_mut()
            .get_or_insert_with(|| {
                StaticViewDescriptor::new(DescriptorKind::Component, self.decls, self.template.clone())
            })
            .clone()
    }

    /// The root host descriptor used when bootstrapping this type, created on first use.
    pub fn root_tview(&self) -> Rc<StaticViewDescriptor> {
        self.root_tview
            .borrow_mut()
            .get_or_insert_with(|| StaticViewDescriptor::new(DescriptorKind::Root, 1, None))
            .clone()
    }

    /// Drop a root host descriptor whose first creation pass failed halfway.
    pub(crate) fn discard_incomplete_root_tview(&self) {
        let mut cached = self.root_tview.borrow_mut();
        if cached.as_ref().is_some_and(|tview| tview.is_first_create_pass()) {
            *cached = None;
        }
    }
}

impl fmt::Debug for ComponentDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDef")
            .field("type", &self.token.name())
            .field("selector", &self.selector)
            .field("host_attrs", &self.host_attrs)
            .field("change_detection", &self.change_detection)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Typed builder; every closure receives the concrete component type.
pub struct ComponentDefBuilder<T> {
    selector: String,
    factory: ComponentFactoryFn,
    host_attrs: Option<TAttributes>,
    change_detection: ChangeDetection,
    decls: usize,
    template: Option<TemplateFn>,
    host_bindings: Option<HostBindingsFn>,
    content_queries: Option<ContentQueriesFn>,
    hooks: LifecycleHooks,
    _marker: std::marker::PhantomData<fn() -> T>,
}

/// Wrap a typed callback so it can be stored type-erased.
fn erase_hook<T: 'static>(hook: impl Fn(&T) + 'static) -> HookFn {
    Rc::new(move |instance: &ComponentInstance| {
        if let Some(component) = (**instance).downcast_ref::<T>() {
            hook(component);
        }
    })
}

impl<T: 'static> ComponentDefBuilder<T> {
    fn new(selector: &str, factory: impl Fn(&dyn Injector) -> Result<T> + 'static) -> Self {
        Self {
            selector: selector.to_string(),
            factory: Rc::new(move |injector: &dyn Injector| {
                factory(injector).map(|component| Rc::new(component) as ComponentInstance)
            }),
            host_attrs: None,
            change_detection: ChangeDetection::Default,
            decls: 0,
            template: None,
            host_bindings: None,
            content_queries: None,
            hooks: LifecycleHooks::default(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Static host attributes. An empty list counts as none.
    pub fn host_attrs(mut self, attrs: TAttributes) -> Self {
        self.host_attrs = (!attrs.is_empty()).then_some(attrs);
        self
    }

    pub fn on_push(mut self) -> Self {
        self.change_detection = ChangeDetection::OnPush;
        self
    }

    pub fn change_detection(mut self, strategy: ChangeDetection) -> Self {
        self.change_detection = strategy;
        self
    }

    /// Number of declaration slots in the component's own view.
    pub fn decls(mut self, decls: usize) -> Self {
        self.decls = decls;
        self
    }

    pub fn template(mut self, template: impl Fn(RenderFlags, &T) + 'static) -> Self {
        self.template = Some(Rc::new(move |rf, instance: &ComponentInstance| {
            if let Some(component) = (**instance).downcast_ref::<T>() {
                template(rf, component);
            }
        }));
        self
    }

    pub fn host_bindings(mut self, host_bindings: impl Fn(RenderFlags, &T) + 'static) -> Self {
        self.host_bindings = Some(Rc::new(move |rf, instance: &ComponentInstance| {
            if let Some(component) = (**instance).downcast_ref::<T>() {
                host_bindings(rf, component);
            }
        }));
        self
    }

    pub fn content_queries(mut self, content_queries: impl Fn(RenderFlags, &T, usize) + 'static) -> Self {
        self.content_queries = Some(Rc::new(move |rf, instance: &ComponentInstance, directive_index| {
            if let Some(component) = (**instance).downcast_ref::<T>() {
                content_queries(rf, component, directive_index);
            }
        }));
        self
    }

    pub fn after_content_init(mut self, hook: impl Fn(&T) + 'static) -> Self {
        self.hooks.after_content_init = Some(erase_hook(hook));
        self
    }

    pub fn after_content_checked(mut self, hook: impl Fn(&T) + 'static) -> Self {
        self.hooks.after_content_checked = Some(erase_hook(hook));
        self
    }

    pub fn after_view_init(mut self, hook: impl Fn(&T) + 'static) -> Self {
        self.hooks.after_view_init = Some(erase_hook(hook));
        self
    }

    pub fn after_view_checked(mut self, hook: impl Fn(&T) + 'static) -> Self {
        self.hooks.after_view_checked = Some(erase_hook(hook));
        self
    }

    pub fn on_destroy(mut self, hook: impl Fn(&T) + 'static) -> Self {
        self.hooks.on_destroy = Some(erase_hook(hook));
        self
    }

    pub fn build(self) -> Rc<ComponentDef> {
        Rc::new(ComponentDef {
            token: Token::of::<T>(),
            selector: self.selector,
            host_attrs: self.host_attrs,
            change_detection: self.change_detection,
            decls: self.decls,
            factory: self.factory,
            template: self.template,
            host_bindings: self.host_bindings,
            content_queries: self.content_queries,
            hooks: self.hooks,
            tview: RefCell::new(None),
            root_tview: RefCell::new(None),
        })
    }
}
