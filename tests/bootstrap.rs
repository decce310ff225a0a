//! End-to-end bootstrap tests.
//!
//! Drives the public API the way an application would:
//! - bootstrap through `render_component` / `ComponentFactory`
//! - mark components dirty and drain the animation-frame queue
//! - observe completion signals and the reactive flush counter
//!
//! Run with: cargo test --test bootstrap

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::FutureExt;
use pretty_assertions::assert_eq;
use spark_signals::effect;

use spark_view::engine::{enter_view, leave_view, ViewContext, ViewRecord};
use spark_view::{
    add_player, create_root_component, create_root_component_view, create_root_context,
    flush_animation_frame, pending_animation_frames, render_component, reset_animation_frames,
    when_rendered, ComponentDef, ComponentFactory, ComponentInstance, CreateComponentOptions,
    DomRendererFactory, Element, HostFeature, HostTarget, Player, PlayerHandler, Provider,
    RenderError, RenderFlags, RendererFactory, Scheduler, StaticInjector, TAttributes, Token,
    ViewFlags,
};

// =============================================================================
// FIXTURES
// =============================================================================

struct Greeter {
    greeting: String,
}

struct Greeting(&'static str);

struct Counter {
    updates: Cell<u32>,
}

fn counter_def(on_push: bool) -> Rc<ComponentDef> {
    let builder = ComponentDef::builder("app-counter", |_| {
        Ok(Counter {
            updates: Cell::new(0),
        })
    })
    .template(|rf, counter: &Counter| {
        if rf.contains(RenderFlags::UPDATE) {
            counter.updates.set(counter.updates.get() + 1);
        }
    });
    if on_push { builder.on_push().build() } else { builder.build() }
}

fn updates(instance: &ComponentInstance) -> u32 {
    spark_view::downcast_component::<Counter>(instance)
        .map(|counter| counter.updates.get())
        .unwrap_or_default()
}

// =============================================================================
// BOOTSTRAP
// =============================================================================

#[test]
fn test_bootstrap_with_default_scheduler_is_settled() {
    let def = ComponentDef::builder("app-x", |_| Ok(0u8))
        .host_attrs(TAttributes::from_host(&[("class", "x")]))
        .build();

    let component = render_component(&def, CreateComponentOptions::default()).unwrap();

    assert_eq!(*component.root_context().scheduler(), Scheduler::Default);
    assert_eq!(component.host_element().class_name(), "x");
    let rendered = when_rendered(component.instance()).unwrap();
    assert_eq!(rendered.now_or_never(), Some(()));
}

#[test]
fn test_host_writes_land_in_order() {
    let def = ComponentDef::builder("app-styled", |_| Ok(()))
        .host_attrs(
            TAttributes::new()
                .style("width", "10px")
                .class("card")
                .attr("role", "region")
                .style("color", "red"),
        )
        .build();
    let host = Element::new("section");

    render_component(&def, CreateComponentOptions::default().host(HostTarget::Element(host.clone()))).unwrap();

    let names: Vec<String> = host.attributes().into_iter().map(|attr| attr.name).collect();
    assert_eq!(names, vec!["role", "class", "style"]);
    assert_eq!(host.style_text(), "width: 10px; color: red;");
}

#[test]
fn test_root_components_keep_instantiation_order() {
    let first = ComponentDef::builder("app-a", |_| Ok("a")).build();
    let second = ComponentDef::builder("app-b", |_| Ok("b")).build();
    let root_context = create_root_context(None, None);
    let factory: Rc<dyn RendererFactory> = Rc::new(DomRendererFactory::new());
    let host_renderer = factory.create_renderer(None, None);

    let mut instances = Vec::new();
    for def in [&first, &second] {
        let root_view = ViewRecord::new(
            def.root_tview(),
            None,
            ViewFlags::IS_ROOT | ViewFlags::CHECK_ALWAYS,
            factory.clone(),
            host_renderer.clone(),
        )
        .with_context(ViewContext::Root(root_context.clone()))
        .into_ref();

        enter_view(&root_view);
        let component_view = create_root_component_view(None, def, &root_view, &factory, &host_renderer, None);
        let instance = create_root_component(&component_view, def, &root_view, &root_context, &[]).unwrap();
        leave_view();
        instances.push((instance, root_view));
    }

    let components = root_context.components();
    assert_eq!(components.len(), 2);
    assert!(Rc::ptr_eq(&components[0], &instances[0].0));
    assert!(Rc::ptr_eq(&components[1], &instances[1].0));
    assert!(when_rendered(&instances[1].0).unwrap().is_clean());
}

#[test]
fn test_host_bindings_run_once_per_type() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let log = calls.clone();
    let def = ComponentDef::builder("app-bound", |_| Ok(()))
        .host_bindings(move |rf, _: &()| {
            let mode = if rf.contains(RenderFlags::CREATE) { "create" } else { "update" };
            log.borrow_mut().push(mode);
        })
        .build();

    render_component(&def, CreateComponentOptions::default()).unwrap();
    render_component(&def, CreateComponentOptions::default()).unwrap();

    // One create for the type; every first update pass runs the registered program.
    assert_eq!(*calls.borrow(), vec!["create", "update", "update"]);
}

// =============================================================================
// DEPENDENCY INJECTION
// =============================================================================

#[test]
fn test_missing_provider_propagates() {
    let def = ComponentDef::builder("app-greeter", |injector| {
        let greeting = injector.resolve::<Greeting>(&Token::of::<Greeting>())?;
        Ok(Greeter {
            greeting: greeting.0.to_string(),
        })
    })
    .build();

    let err = render_component(&def, CreateComponentOptions::default()).err().unwrap();
    assert_eq!(
        err,
        RenderError::ProviderNotFound {
            token: "Greeting".to_string(),
            injector: "NullInjector".to_string(),
        }
    );
    assert_eq!(err.to_string(), "No provider for Greeting! (injector: NullInjector)");

    // The type can still be bootstrapped once a provider exists.
    let injector = StaticInjector::create(vec![Provider::value(Token::of::<Greeting>(), Greeting("hello"))]);
    let component = render_component(&def, CreateComponentOptions::default().injector(injector)).unwrap();
    assert_eq!(component.downcast::<Greeter>().unwrap().greeting, "hello");
}

#[test]
fn test_component_cannot_inject_itself() {
    struct Selfish;
    let def = ComponentDef::builder("app-selfish", |injector| {
        injector.resolve::<Selfish>(&Token::of::<Selfish>())?;
        Ok(Selfish)
    })
    .build();

    let err = render_component(&def, CreateComponentOptions::default()).err().unwrap();
    assert!(matches!(err, RenderError::CyclicDependency { .. }));
}

// =============================================================================
// CHANGE DETECTION
// =============================================================================

#[test]
fn test_mark_dirty_coalesces_into_one_frame() {
    reset_animation_frames();
    let component = render_component(&counter_def(true), CreateComponentOptions::default()).unwrap();
    assert_eq!(updates(component.instance()), 1);

    let before = component.when_rendered();
    assert!(component.when_rendered().same_as(&before));

    assert!(component.mark_dirty());
    assert!(component.mark_dirty());
    let pending = component.when_rendered();
    assert!(!pending.same_as(&before));
    assert!(!pending.is_resolved());
    assert_eq!(pending_animation_frames(), 1);

    assert_eq!(flush_animation_frame(), 1);
    assert!(pending.is_resolved());
    assert_eq!(updates(component.instance()), 2);
    assert_eq!(component.root_context().flush_count(), 1);
}

#[test]
fn test_on_push_skipped_unless_dirty() {
    let component = render_component(&counter_def(true), CreateComponentOptions::default()).unwrap();
    component.detect_changes();
    component.detect_changes();
    assert_eq!(updates(component.instance()), 1);

    let check_always = render_component(&counter_def(false), CreateComponentOptions::default()).unwrap();
    check_always.detect_changes();
    assert_eq!(updates(check_always.instance()), 2);
}

#[test]
fn test_custom_scheduler_receives_work() {
    let queue: Rc<RefCell<Vec<spark_view::Work>>> = Rc::default();
    let handle = queue.clone();
    let component = render_component(
        &counter_def(false),
        CreateComponentOptions::default().scheduler(Scheduler::custom(move |work| handle.borrow_mut().push(work))),
    )
    .unwrap();

    component.mark_dirty();
    let rendered = component.when_rendered();
    assert_eq!(queue.borrow().len(), 1);

    let work = queue.borrow_mut().remove(0);
    work();
    assert_eq!(futures::executor::block_on(rendered), ());
}

#[test]
fn test_discarded_flush_never_reports_rendered() {
    let queue: Rc<RefCell<Vec<spark_view::Work>>> = Rc::default();
    let handle = queue.clone();
    let component = render_component(
        &counter_def(false),
        CreateComponentOptions::default().scheduler(Scheduler::custom(move |work| handle.borrow_mut().push(work))),
    )
    .unwrap();

    assert!(component.mark_dirty());
    let rendered = component.when_rendered();
    queue.borrow_mut().clear();

    assert!(!rendered.is_resolved());
    assert_eq!(rendered.now_or_never(), None);
    assert_eq!(component.root_context().flush_count(), 0);
    assert_eq!(updates(component.instance()), 1);
}

#[test]
fn test_lifecycle_hooks_feature() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let init = log.clone();
    let checked = log.clone();
    let def = ComponentDef::builder("app-hooked", |_| Ok(()))
        .after_view_init(move |_: &()| init.borrow_mut().push("init"))
        .after_view_checked(move |_: &()| checked.borrow_mut().push("checked"))
        .build();

    let component = render_component(
        &def,
        CreateComponentOptions::default().feature(HostFeature::LifecycleHooks),
    )
    .unwrap();
    component.detect_changes();

    assert_eq!(*log.borrow(), vec!["init", "checked", "checked"]);
}

#[test]
fn test_hooks_silent_without_feature() {
    let fired = Rc::new(Cell::new(false));
    let flag = fired.clone();
    let def = ComponentDef::builder("app-quiet", |_| Ok(()))
        .after_view_init(move |_: &()| flag.set(true))
        .build();

    render_component(&def, CreateComponentOptions::default()).unwrap();
    assert!(!fired.get());
}

fn counted_init_def(selector: &str, inits: &Rc<Cell<u32>>) -> Rc<ComponentDef> {
    let count = inits.clone();
    ComponentDef::builder(selector, |_| Ok(()))
        .after_view_init(move |_: &()| count.set(count.get() + 1))
        .build()
}

#[test]
fn test_hooks_feature_added_on_later_bootstrap() {
    let inits = Rc::new(Cell::new(0));
    let def = counted_init_def("app-late-hooks", &inits);

    render_component(&def, CreateComponentOptions::default()).unwrap();
    assert_eq!(inits.get(), 0);

    render_component(&def, CreateComponentOptions::default().feature(HostFeature::LifecycleHooks)).unwrap();
    assert_eq!(inits.get(), 1);
}

#[test]
fn test_hooks_feature_dropped_on_later_bootstrap() {
    let inits = Rc::new(Cell::new(0));
    let def = counted_init_def("app-early-hooks", &inits);

    let hooked = render_component(&def, CreateComponentOptions::default().feature(HostFeature::LifecycleHooks)).unwrap();
    assert_eq!(inits.get(), 1);

    let plain = render_component(&def, CreateComponentOptions::default()).unwrap();
    plain.detect_changes();
    assert_eq!(inits.get(), 1);
    assert!(plain.host_view().borrow().hooks().is_empty());
    assert!(!hooked.host_view().borrow().hooks().is_empty());
}

#[test]
fn test_factory_applies_lifecycle_hooks() {
    let inits = Rc::new(Cell::new(0));
    let count = inits.clone();
    let def = ComponentDef::builder("app-factory", |_| Ok(()))
        .after_view_init(move |_: &()| count.set(count.get() + 1))
        .build();

    ComponentFactory::new(def)
        .create(StaticInjector::create(vec![]), None, None)
        .unwrap();
    assert_eq!(inits.get(), 1);
}

// =============================================================================
// REACTIVITY & PLAYERS
// =============================================================================

#[derive(Default)]
struct BufferedPlayers {
    queued: RefCell<Vec<Rc<dyn Player>>>,
}

impl PlayerHandler for BufferedPlayers {
    fn flush_players(&self) {
        let players: Vec<_> = self.queued.borrow_mut().drain(..).collect();
        for player in players {
            player.play();
        }
    }

    fn queue_player(&self, player: Rc<dyn Player>) {
        self.queued.borrow_mut().push(player);
    }
}

struct Fade(Rc<Cell<bool>>);

impl Player for Fade {
    fn play(&self) {
        self.0.set(true);
    }
}

#[test]
fn test_flush_counter_drives_effects() {
    reset_animation_frames();
    let players = Rc::new(BufferedPlayers::default());
    let component = render_component(
        &counter_def(false),
        CreateComponentOptions {
            player_handler: Some(players),
            ..Default::default()
        },
    )
    .unwrap();

    let seen = Rc::new(Cell::new(0u64));
    let flushes = component.root_context().flush_signal();
    let seen_in_effect = seen.clone();
    let _stop = effect(move || seen_in_effect.set(flushes.get()));

    let played = Rc::new(Cell::new(false));
    assert!(add_player(component.root_context(), Rc::new(Fade(played.clone()))));
    component.mark_dirty();
    assert_eq!(pending_animation_frames(), 1);

    flush_animation_frame();
    assert!(played.get());
    assert_eq!(seen.get(), 1);
    assert_eq!(updates(component.instance()), 2);
}
