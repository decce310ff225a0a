//! Injectors - Token resolution chains.
//!
//! Every chain ends in a [`NullInjector`], which fails for every token with
//! a "provider not found" error naming the token and itself.

use std::any::Any;
use std::cell::OnceCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{RenderError, Result};
use crate::renderer::RendererFactory;
use crate::sanitization::Sanitizer;
use super::token::{Token, RENDERER_FACTORY, SANITIZER};

// =============================================================================
// Injector
// =============================================================================

pub trait Injector {
    /// Resolve `token`, failing with [`RenderError::ProviderNotFound`] when
    /// nothing in the chain provides it.
    fn get(&self, token: &Token) -> Result<Rc<dyn Any>>;

    /// Name used in "provider not found" errors.
    fn name(&self) -> &str;

    fn get_optional(&self, token: &Token) -> Option<Rc<dyn Any>> {
        self.get(token).ok()
    }
}

impl dyn Injector + '_ {
    /// Resolve `token` as a `T`.
    ///
    /// A value provided under the token with another type counts as not provided.
    pub fn resolve<T: 'static>(&self, token: &Token) -> Result<Rc<T>> {
        self.get(token)?
            .downcast::<T>()
            .map_err(|_| RenderError::provider_not_found(token.name(), self.name()))
    }

    pub fn resolve_optional<T: 'static>(&self, token: &Token) -> Option<Rc<T>> {
        self.get_optional(token)?.downcast::<T>().ok()
    }
}

// =============================================================================
// Null Injector
// =============================================================================

/// The end of every injector chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullInjector;

impl Injector for NullInjector {
    fn get(&self, token: &Token) -> Result<Rc<dyn Any>> {
        Err(RenderError::provider_not_found(token.name(), self.name()))
    }

    fn name(&self) -> &str {
        "NullInjector"
    }
}

// =============================================================================
// Providers
// =============================================================================

enum ProviderKind {
    Value(Rc<dyn Any>),
    Factory(Box<dyn Fn() -> Rc<dyn Any>>),
}

/// A value or lazy factory registered under a token.
pub struct Provider {
    token: Token,
    kind: ProviderKind,
}

impl Provider {
    pub fn value<T: 'static>(token: Token, value: T) -> Self {
        Self {
            token,
            kind: ProviderKind::Value(Rc::new(value)),
        }
    }

    /// Provide the result of `factory`, called once on first lookup.
    pub fn factory<T: 'static>(token: Token, factory: impl Fn() -> T + 'static) -> Self {
        Self {
            token,
            kind: ProviderKind::Factory(Box::new(move || Rc::new(factory()) as Rc<dyn Any>)),
        }
    }

    /// Provide the renderer factory used for bootstrap.
    ///
    /// Resolve it with `resolve::<Rc<dyn RendererFactory>>(&RENDERER_FACTORY)`.
    pub fn renderer_factory(factory: Rc<dyn RendererFactory>) -> Self {
        Self::value(RENDERER_FACTORY, factory)
    }

    pub fn sanitizer(sanitizer: Rc<dyn Sanitizer>) -> Self {
        Self::value(SANITIZER, sanitizer)
    }

    pub fn sanitizer_factory(factory: impl Fn() -> Rc<dyn Sanitizer> + 'static) -> Self {
        Self::factory(SANITIZER, factory)
    }

    pub fn token(&self) -> &Token {
        &self.token
    }
}

// =============================================================================
// Static Injector
// =============================================================================

struct Record {
    kind: ProviderKind,
    value: OnceCell<Rc<dyn Any>>,
}

/// Injector over a fixed provider list, falling back to a parent.
pub struct StaticInjector {
    records: HashMap<Token, Record>,
    parent: Rc<dyn Injector>,
}

impl StaticInjector {
    /// Create an injector whose parent is the [`NullInjector`].
    pub fn create(providers: Vec<Provider>) -> Rc<dyn Injector> {
        Self::with_parent(providers, Rc::new(NullInjector))
    }

    pub fn with_parent(providers: Vec<Provider>, parent: Rc<dyn Injector>) -> Rc<dyn Injector> {
        let records = providers
            .into_iter()
            .map(|provider| {
                let record = Record {
                    kind: provider.kind,
                    value: OnceCell::new(),
                };
                (provider.token, record)
            })
            .collect();
        Rc::new(Self { records, parent })
    }
}

impl Injector for StaticInjector {
    fn get(&self, token: &Token) -> Result<Rc<dyn Any>> {
        match self.records.get(token) {
            Some(record) => Ok(record
                .value
                .get_or_init(|| match &record.kind {
                    ProviderKind::Value(value) => value.clone(),
                    ProviderKind::Factory(factory) => factory(),
                })
                .clone()),
            None => self.parent.get(token),
        }
    }

    fn name(&self) -> &str {
        "StaticInjector"
    }
}

// =============================================================================
// Chained Injector
// =============================================================================

/// Looks in `injector` first, then in `parent_injector`.
///
/// Used to put an element injector in front of a module injector.
pub struct ChainedInjector {
    injector: Rc<dyn Injector>,
    parent_injector: Rc<dyn Injector>,
}

impl ChainedInjector {
    pub fn new(injector: Rc<dyn Injector>, parent_injector: Rc<dyn Injector>) -> Self {
        Self {
            injector,
            parent_injector,
        }
    }
}

impl Injector for ChainedInjector {
    fn get(&self, token: &Token) -> Result<Rc<dyn Any>> {
        match self.injector.get_optional(token) {
            Some(value) => Ok(value),
            None => self.parent_injector.get(token),
        }
    }

    fn name(&self) -> &str {
        "ChainedInjector"
    }
}
