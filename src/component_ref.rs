//! Component References - Handles to bootstrapped components.
//!
//! - [`ComponentFactory`] - Bootstraps a component type, resolving its
//!   renderer factory and sanitizer through injectors
//! - [`ComponentRef`] - The result: instance, views, root context, teardown

use std::cell::Cell;
use std::rc::Rc;

use tracing::debug;

use crate::component::{render_component, CreateComponentOptions, HostFeature, HostTarget};
use crate::di::{ChainedInjector, Injector, RENDERER_FACTORY, SANITIZER};
use crate::engine::{detach_patch_data, execute_destroy_hooks, mark_dirty, tick_root_context, ComponentDef, ViewRef};
use crate::error::Result;
use crate::renderer::{DomRendererFactory, RElement, RendererFactory};
use crate::root_context::RootContext;
use crate::sanitization::Sanitizer;
use crate::scheduler::CleanPromise;
use crate::types::{downcast_component, ComponentInstance, ViewFlags};

// =============================================================================
// Component Ref
// =============================================================================

pub struct ComponentRef {
    instance: ComponentInstance,
    def: Rc<ComponentDef>,
    host_view: ViewRef,
    component_view: ViewRef,
    root_context: Rc<RootContext>,
    host_element: RElement,
    destroyed: Cell<bool>,
}

impl ComponentRef {
    pub(crate) fn new(
        instance: ComponentInstance,
        def: Rc<ComponentDef>,
        host_view: ViewRef,
        component_view: ViewRef,
        root_context: Rc<RootContext>,
        host_element: RElement,
    ) -> Self {
        Self {
            instance,
            def,
            host_view,
            component_view,
            root_context,
            host_element,
            destroyed: Cell::new(false),
        }
    }

    pub fn instance(&self) -> &ComponentInstance {
        &self.instance
    }

    /// The instance as its concrete type.
    pub fn downcast<T: 'static>(&self) -> Option<Rc<T>> {
        downcast_component(&self.instance)
    }

    pub fn def(&self) -> &Rc<ComponentDef> {
        &self.def
    }

    /// The synthetic root view hosting the component.
    pub fn host_view(&self) -> &ViewRef {
        &self.host_view
    }

    pub fn component_view(&self) -> &ViewRef {
        &self.component_view
    }

    pub fn root_context(&self) -> &Rc<RootContext> {
        &self.root_context
    }

    pub fn host_element(&self) -> &RElement {
        &self.host_element
    }

    /// Resolves once the root has no flush pending.
    pub fn when_rendered(&self) -> CleanPromise {
        self.root_context.clean()
    }

    /// Run change detection over the root right now.
    pub fn detect_changes(&self) {
        if !self.is_destroyed() {
            tick_root_context(&self.root_context);
        }
    }

    /// Mark the component dirty and schedule a flush.
    pub fn mark_dirty(&self) -> bool {
        !self.is_destroyed() && mark_dirty(&self.instance)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    /// Run the on-destroy hooks and detach the component from its root.
    ///
    /// Later calls are no-ops.
    pub fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        execute_destroy_hooks(&self.host_view);
        detach_patch_data(&self.instance);
        self.root_context.remove_component(&self.instance);
        for view in [&self.component_view, &self.host_view] {
            let mut view = view.borrow_mut();
            view.insert_flags(ViewFlags::DESTROYED);
            view.remove_flags(ViewFlags::ATTACHED);
        }
        debug!(component = self.def.selector(), "root component destroyed");
    }
}

// =============================================================================
// Component Factory
// =============================================================================

/// Creates root components of one type.
pub struct ComponentFactory {
    def: Rc<ComponentDef>,
    module_injector: Option<Rc<dyn Injector>>,
}

impl ComponentFactory {
    pub fn new(def: Rc<ComponentDef>) -> Self {
        Self {
            def,
            module_injector: None,
        }
    }

    /// A factory whose `create` falls back to `module_injector` when the
    /// caller passes none.
    pub fn bound_to(def: Rc<ComponentDef>, module_injector: Rc<dyn Injector>) -> Self {
        Self {
            def,
            module_injector: Some(module_injector),
        }
    }

    /// The selector list, normalized to comma-separated without spaces.
    pub fn selector(&self) -> String {
        self.def
            .selector()
            .split(',')
            .map(str::trim)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn component_type_name(&self) -> &'static str {
        self.def.type_name()
    }

    /// Bootstrap the component into `host`.
    ///
    /// The renderer factory and sanitizer come from `element_injector`
    /// first, then the module injector. Without a provided renderer factory
    /// an in-memory DOM renderer is used.
    pub fn create(
        &self,
        element_injector: Rc<dyn Injector>,
        host: Option<HostTarget>,
        module_injector: Option<Rc<dyn Injector>>,
    ) -> Result<ComponentRef> {
        let module_injector = module_injector.or_else(|| self.module_injector.clone());
        let root_injector: Rc<dyn Injector> = match module_injector {
            Some(module_injector) => Rc::new(ChainedInjector::new(element_injector, module_injector)),
            None => element_injector,
        };

        let renderer_factory = match root_injector.resolve_optional::<Rc<dyn RendererFactory>>(&RENDERER_FACTORY) {
            Some(renderer_factory) => Rc::clone(&*renderer_factory),
            None => {
                debug!("no renderer factory provided, using the DOM renderer");
                Rc::new(DomRendererFactory::new())
            }
        };
        let sanitizer = root_injector
            .resolve_optional::<Rc<dyn Sanitizer>>(&SANITIZER)
            .map(|sanitizer| Rc::clone(&*sanitizer));

        render_component(
            &self.def,
            CreateComponentOptions {
                renderer_factory: Some(renderer_factory),
                sanitizer,
                host,
                injector: Some(root_injector),
                host_features: vec![HostFeature::LifecycleHooks],
                ..Default::default()
            },
        )
    }
}
