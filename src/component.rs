//! Root Bootstrap - Assembling a component into a fresh root.
//!
//! Bootstrapping a component builds two views:
//!
//! ```text
//! root view (IS_ROOT, context = RootContext)
//!   [HEADER_OFFSET]     #host node ──► component view (context = instance)
//!   [HEADER_OFFSET + 1] component instance
//! ```
//!
//! [`create_root_component_view`] links the component view under the root
//! view and writes the static host styling. [`create_root_component`]
//! instantiates the component and applies the host features.
//! [`render_component`] drives both, followed by the creation pass and the
//! first update pass.

use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::component_ref::ComponentRef;
use crate::di::{di_public_in_injector, get_or_create_node_injector_for_node, Injector};
use crate::engine::{
    add_to_view_tree, get_current_node, get_or_create_tnode, get_root_context, get_view,
    init_tnode_flags, instantiate_root_component, invoke_host_bindings_in_creation_mode,
    mark_as_component_host, enter_view, leave_view, refresh_view, register_host_binding_op_codes,
    register_post_order_hooks, render_view, set_selected_index, ComponentDef, Slot, ViewContext,
    ViewRecord, ViewRef,
};
use crate::error::{RenderError, Result};
use crate::renderer::{DomRendererFactory, RElement, Renderer, RendererFactory};
use crate::root_context::{create_root_context, PlayerHandler, RootContext};
use crate::sanitization::Sanitizer;
use crate::scheduler::{CleanPromise, Scheduler};
use crate::styling::{compute_static_styling, set_up_attributes, write_direct_class, write_direct_style};
use crate::types::{ComponentInstance, RenderFlags, ViewFlags, HEADER_OFFSET, HOST_TAG};

// =============================================================================
// Host Features
// =============================================================================

/// Behavior applied to a root component right after it is instantiated.
#[derive(Clone)]
pub enum HostFeature {
    /// Dispatch the component's post-order lifecycle hooks during change
    /// detection, as for any non-root component.
    LifecycleHooks,
    Custom(Rc<dyn Fn(&ComponentInstance, &ComponentDef)>),
}

impl HostFeature {
    pub fn custom(feature: impl Fn(&ComponentInstance, &ComponentDef) + 'static) -> Self {
        Self::Custom(Rc::new(feature))
    }

    /// Apply the feature to a freshly created root component.
    ///
    /// Must run while the root view is entered and its host node is current.
    pub fn apply(&self, component: &ComponentInstance, def: &ComponentDef) {
        match self {
            Self::LifecycleHooks => {
                let view = get_view();
                let node_index = get_current_node();
                debug_assert!(
                    view.is_some() && node_index.is_some(),
                    "lifecycle hooks feature applied outside of a creation pass"
                );
                if let (Some(view), Some(node_index)) = (view, node_index) {
                    register_post_order_hooks(&view, node_index);
                }
            }
            Self::Custom(feature) => feature(component, def),
        }
    }
}

impl fmt::Debug for HostFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LifecycleHooks => f.write_str("LifecycleHooks"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

// =============================================================================
// Root View Assembly
// =============================================================================

/// Create the component's view and link it under `root_view`.
///
/// Static host attributes are merged onto the host node once per root
/// descriptor; they are written to `host` (when present) in the order
/// attributes, classes, styles. The component renderer is created only
/// after that.
pub fn create_root_component_view(
    host: Option<RElement>,
    def: &Rc<ComponentDef>,
    root_view: &ViewRef,
    renderer_factory: &Rc<dyn RendererFactory>,
    host_renderer: &Rc<dyn Renderer>,
    sanitizer: Option<Rc<dyn Sanitizer>>,
) -> ViewRef {
    let tview = root_view.borrow().tview().clone();
    let index = HEADER_OFFSET;
    debug_assert!(root_view.borrow().len() > index, "root view has no host slot");
    root_view
        .borrow_mut()
        .set_slot(index, host.clone().map(Slot::Element).unwrap_or_default());

    let node_index = get_or_create_tnode(&tview, index, HOST_TAG);

    if tview.is_first_create_pass() {
        if let Some(attrs) = def.host_attrs() {
            tview.edit(|data| {
                if let Some(node) = data.node_mut(node_index) {
                    node.merged_attrs = Some(attrs.clone());
                    compute_static_styling(node, attrs);
                }
            });
        }
    }

    let (merged_attrs, classes, styles) = tview
        .read(|data| {
            data.node(node_index)
                .map(|node| (node.merged_attrs.clone(), node.classes.clone(), node.styles.clone()))
        })
        .unwrap_or_default();
    if let (Some(attrs), Some(host)) = (&merged_attrs, &host) {
        set_up_attributes(host_renderer.as_ref(), host, attrs);
        if let Some(classes) = &classes {
            write_direct_class(host_renderer.as_ref(), host, classes);
        }
        if let Some(styles) = &styles {
            write_direct_style(host_renderer.as_ref(), host, styles);
        }
    }
    debug!(
        component = def.selector(),
        has_host = host.is_some(),
        attrs = merged_attrs.as_ref().map_or(0, |attrs| attrs.len()),
        "assembling root component view"
    );

    let renderer = renderer_factory.create_renderer(host.as_ref(), Some(def));
    let flags = if def.is_on_push() {
        ViewFlags::DIRTY
    } else {
        ViewFlags::CHECK_ALWAYS
    };
    let component_view = ViewRecord::new(
        def.component_tview(),
        Some(root_view),
        flags,
        renderer_factory.clone(),
        renderer,
    )
    .with_host(host, Some(node_index))
    .with_sanitizer(sanitizer)
    .into_ref();

    if tview.is_first_create_pass() {
        let injector_index = get_or_create_node_injector_for_node(&tview, node_index);
        di_public_in_injector(&tview, injector_index, def.token());
        mark_as_component_host(&tview, node_index);
        let directive_start = root_view.borrow().len();
        init_tnode_flags(&tview, node_index, directive_start, 1);
    }

    add_to_view_tree(root_view, &component_view);
    root_view
        .borrow_mut()
        .set_slot(index, Slot::View(component_view.clone()));
    component_view
}

// =============================================================================
// Root Component Assembly
// =============================================================================

/// Instantiate the component for `component_view` and register it on `root_context`.
///
/// Host features run in list order. Host bindings are registered and run
/// in create mode only during the root descriptor's first creation pass.
pub fn create_root_component(
    component_view: &ViewRef,
    def: &Rc<ComponentDef>,
    root_view: &ViewRef,
    root_context: &Rc<RootContext>,
    host_features: &[HostFeature],
) -> Result<ComponentInstance> {
    let tview = root_view.borrow().tview().clone();
    let component = instantiate_root_component(&tview, root_view, def)?;

    root_context.push_component(component.clone());
    component_view
        .borrow_mut()
        .set_context(ViewContext::Component(component.clone()));

    for feature in host_features {
        feature.apply(&component, def);
    }

    let node_index = get_current_node();
    debug_assert!(node_index.is_some(), "root node should be current");
    let node_index = node_index.ok_or(RenderError::NoCurrentNode)?;
    let (directive_start, directive_end) = tview
        .read(|data| {
            data.node(node_index)
                .map(|node| (node.directive_start, node.directive_end))
        })
        .unwrap_or_default();

    // Root components never have projected content; the query stays empty.
    if let Some(content_queries) = def.content_queries() {
        content_queries(RenderFlags::CREATE, &component, directive_start);
    }

    if tview.is_first_create_pass() && (def.host_bindings().is_some() || def.host_attrs().is_some()) {
        set_selected_index(node_index);
        register_host_binding_op_codes(&tview, node_index, directive_start, directive_end, def);
        invoke_host_bindings_in_creation_mode(def, &component);
    }

    Ok(component)
}

/// Completion signal of the flush pending on `component`'s root.
///
/// Returns `None` for objects that are not bootstrapped root components.
pub fn when_rendered(component: &ComponentInstance) -> Option<CleanPromise> {
    get_root_context(component).map(|root_context| root_context.clean())
}

// =============================================================================
// Bootstrap
// =============================================================================

/// Where to bootstrap a component.
#[derive(Clone)]
pub enum HostTarget {
    Element(RElement),
    /// Selector handed to the host renderer's `select_root_element`.
    Selector(String),
}

/// Options for [`render_component`].
///
/// ```ignore
/// let component = render_component(&def, CreateComponentOptions {
///     scheduler: Some(Scheduler::custom(|work| work())),
///     host_features: vec![HostFeature::LifecycleHooks],
///     ..Default::default()
/// })?;
/// ```
#[derive(Clone, Default)]
pub struct CreateComponentOptions {
    /// Defaults to an in-memory [`DomRendererFactory`].
    pub renderer_factory: Option<Rc<dyn RendererFactory>>,
    pub sanitizer: Option<Rc<dyn Sanitizer>>,
    pub player_handler: Option<Rc<dyn PlayerHandler>>,
    /// With no host, an element named after the selector is created.
    pub host: Option<HostTarget>,
    /// Module injector of the root view.
    pub injector: Option<Rc<dyn Injector>>,
    pub host_features: Vec<HostFeature>,
    /// Defaults to [`Scheduler::Default`].
    pub scheduler: Option<Scheduler>,
}

impl CreateComponentOptions {
    pub fn renderer_factory(mut self, renderer_factory: Rc<dyn RendererFactory>) -> Self {
        self.renderer_factory = Some(renderer_factory);
        self
    }

    pub fn host(mut self, host: HostTarget) -> Self {
        self.host = Some(host);
        self
    }

    pub fn injector(mut self, injector: Rc<dyn Injector>) -> Self {
        self.injector = Some(injector);
        self
    }

    pub fn feature(mut self, feature: HostFeature) -> Self {
        self.host_features.push(feature);
        self
    }

    pub fn scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = Some(scheduler);
        self
    }
}

/// Keeps the root view entered and the renderer factory open for one pass.
struct CreationPass {
    renderer_factory: Rc<dyn RendererFactory>,
}

impl CreationPass {
    fn enter(root_view: &ViewRef, renderer_factory: &Rc<dyn RendererFactory>) -> Self {
        enter_view(root_view);
        renderer_factory.begin();
        Self {
            renderer_factory: renderer_factory.clone(),
        }
    }
}

impl Drop for CreationPass {
    fn drop(&mut self) {
        leave_view();
        self.renderer_factory.end();
    }
}

/// Bootstrap `def` into a new root and run its first render.
pub fn render_component(def: &Rc<ComponentDef>, options: CreateComponentOptions) -> Result<ComponentRef> {
    let renderer_factory: Rc<dyn RendererFactory> = options
        .renderer_factory
        .unwrap_or_else(|| Rc::new(DomRendererFactory::new()));
    let host_renderer = renderer_factory.create_renderer(None, None);

    let host = match options.host {
        Some(HostTarget::Element(element)) => element,
        Some(HostTarget::Selector(selector)) => host_renderer
            .select_root_element(&selector)
            .ok_or(RenderError::HostElementNotFound { selector })?,
        None => host_renderer.create_element(def.tag_name(), None),
    };

    let root_context = create_root_context(options.scheduler, options.player_handler);
    let mut root_flags = ViewFlags::IS_ROOT;
    root_flags |= if def.is_on_push() {
        ViewFlags::DIRTY
    } else {
        ViewFlags::CHECK_ALWAYS
    };
    let root_view = ViewRecord::new(
        def.root_tview(),
        None,
        root_flags,
        renderer_factory.clone(),
        host_renderer.clone(),
    )
    .with_sanitizer(options.sanitizer.clone())
    .with_injector(options.injector)
    .with_context(ViewContext::Root(root_context.clone()))
    .into_ref();

    let bootstrapped = {
        let _pass = CreationPass::enter(&root_view, &renderer_factory);
        let component_view = create_root_component_view(
            Some(host.clone()),
            def,
            &root_view,
            &renderer_factory,
            &host_renderer,
            options.sanitizer,
        );
        create_root_component(
            &component_view,
            def,
            &root_view,
            &root_context,
            &options.host_features,
        )
        .map(|component| {
            render_view(&root_view);
            refresh_view(&root_view);
            (component, component_view)
        })
    };

    let (component, component_view) = bootstrapped.inspect_err(|err| {
        debug!(component = def.selector(), %err, "bootstrap failed");
        def.discard_incomplete_root_tview();
    })?;
    trace!(component = def.selector(), "root component rendered");

    Ok(ComponentRef::new(
        component,
        def.clone(),
        root_view,
        component_view,
        root_context,
        host,
    ))
}
