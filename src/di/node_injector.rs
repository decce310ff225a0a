//! Node Injector - Directive lookup scoped to one node.
//!
//! A node injector resolves tokens published on its node (the component
//! type of a root host, for example) to the directive instances stored in
//! the view, and hands everything else to the nearest module injector up
//! the view chain. With no module injector the chain ends in the
//! [`NullInjector`].

use std::any::Any;
use std::rc::Rc;

use tracing::trace;

use crate::engine::{StaticViewDescriptor, ViewRef, Slot};
use crate::error::{RenderError, Result};
use crate::types::ComponentInstance;
use super::injector::{Injector, NullInjector};
use super::token::Token;

pub struct NodeInjector {
    view: ViewRef,
    node_index: usize,
}

impl NodeInjector {
    pub fn new(view: ViewRef, node_index: usize) -> Self {
        Self { view, node_index }
    }

    /// Directive slot at this node whose type is published as `token`.
    fn published_directive(&self, token: &Token) -> Option<usize> {
        let tview = self.view.borrow().tview().clone();
        tview.read(|data| {
            let node = data.node(self.node_index)?;
            if !node.published.contains(token) {
                return None;
            }
            node.directive_range()
                .find(|&index| data.directive(index).is_some_and(|def| def.token() == *token))
        })
    }
}

impl Injector for NodeInjector {
    fn get(&self, token: &Token) -> Result<Rc<dyn Any>> {
        if let Some(directive_index) = self.published_directive(token) {
            return get_node_injectable(&self.view, directive_index, self.node_index);
        }
        module_injector(&self.view).get(token)
    }

    fn name(&self) -> &str {
        "NodeInjector"
    }
}

/// Nearest injector configured on `view` or one of its ancestors.
pub fn module_injector(view: &ViewRef) -> Rc<dyn Injector> {
    let mut current = Some(view.clone());
    while let Some(view) = current {
        let view = view.borrow();
        if let Some(injector) = view.injector() {
            return injector.clone();
        }
        current = view.parent();
    }
    Rc::new(NullInjector)
}

/// Make sure the node at `node_index` owns a node injector.
///
/// Only has an effect during the descriptor's first creation pass.
pub fn get_or_create_node_injector_for_node(tview: &StaticViewDescriptor, node_index: usize) -> usize {
    if tview.is_first_create_pass() {
        tview.edit(|data| {
            if let Some(node) = data.node_mut(node_index) {
                node.injector_index.get_or_insert(node_index);
            }
        });
    }
    node_index
}

/// Publish `token` through the node injector at `injector_index`.
pub fn di_public_in_injector(tview: &StaticViewDescriptor, injector_index: usize, token: Token) {
    tview.edit(|data| {
        let node = data.node_mut(injector_index);
        debug_assert!(node.is_some(), "no node descriptor at {injector_index}");
        if let Some(node) = node {
            if !node.published.contains(&token) {
                node.published.push(token);
            }
        }
    });
}

/// The directive instance at `directive_index`, instantiating it on first access.
///
/// The factory runs with a node injector for `node_index`. A factory that
/// asks for its own directive fails with [`RenderError::CyclicDependency`].
pub fn get_node_injectable(view: &ViewRef, directive_index: usize, node_index: usize) -> Result<ComponentInstance> {
    let (slot, tview) = {
        let view = view.borrow();
        (view.slot(directive_index).cloned(), view.tview().clone())
    };
    let def = tview.read(|data| data.directive(directive_index).cloned());
    debug_assert!(def.is_some(), "no directive registered at {directive_index}");

    match slot {
        Some(Slot::Directive(instance)) => return Ok(instance),
        Some(Slot::Pending) => {
            return Err(RenderError::CyclicDependency {
                token: def.map(|def| def.type_name().to_string()).unwrap_or_default(),
            });
        }
        _ => {}
    }
    let Some(def) = def else {
        return Err(RenderError::provider_not_found("<unknown directive>", "NodeInjector"));
    };

    trace!(component = def.type_name(), directive_index, "instantiating directive");
    view.borrow_mut().set_slot(directive_index, Slot::Pending);
    let injector = NodeInjector::new(view.clone(), node_index);
    match def.create(&injector) {
        Ok(instance) => {
            view.borrow_mut().set_slot(directive_index, Slot::Directive(instance.clone()));
            Ok(instance)
        }
        Err(err) => {
            view.borrow_mut().set_slot(directive_index, Slot::Empty);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{render_component, CreateComponentOptions};
    use crate::di::{Provider, StaticInjector};
    use crate::engine::ComponentDef;
    use crate::types::HEADER_OFFSET;

    struct Shell;

    const THEME: Token = Token::named("Theme");

    #[test]
    fn test_published_component_resolves_to_instance() {
        let def = ComponentDef::builder("app-shell", |_| Ok(Shell)).build();
        let component = render_component(&def, CreateComponentOptions::default()).unwrap();

        let injector = NodeInjector::new(component.host_view().clone(), HEADER_OFFSET);
        let resolved = injector.get(&def.token()).unwrap();
        assert!(Rc::ptr_eq(&resolved, component.instance()));
    }

    #[test]
    fn test_falls_back_to_module_injector() {
        let def = ComponentDef::builder("app-shell", |_| Ok(Shell)).build();
        let module = StaticInjector::create(vec![Provider::value(THEME, "dark")]);
        let component = render_component(&def, CreateComponentOptions::default().injector(module)).unwrap();

        let injector: Rc<dyn Injector> = Rc::new(NodeInjector::new(component.host_view().clone(), HEADER_OFFSET));
        assert_eq!(*injector.resolve::<&str>(&THEME).unwrap(), "dark");
    }

    #[test]
    fn test_without_module_injector_ends_in_null_injector() {
        let def = ComponentDef::builder("app-shell", |_| Ok(Shell)).build();
        let component = render_component(&def, CreateComponentOptions::default()).unwrap();

        let err = NodeInjector::new(component.host_view().clone(), HEADER_OFFSET)
            .get(&THEME)
            .err()
            .unwrap();
        assert_eq!(err, RenderError::provider_not_found("Theme", "NullInjector"));
        assert_eq!(module_injector(component.component_view()).name(), "NullInjector");
    }
}
