//! Dependency Injection - Tokens, injectors and node-scoped lookup.
//!
//! - [`Token`] - Type or named key
//! - [`Injector`] - Resolution contract; [`NullInjector`] ends every chain
//! - [`StaticInjector`] / [`ChainedInjector`] - Provider lists and chains
//! - [`NodeInjector`] - Directives published on a node, then the module injector

mod injector;
mod node_injector;
mod token;

pub use injector::*;
pub use node_injector::*;
pub use token::*;
