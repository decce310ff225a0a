//! Error types for spark-view.
//!
//! Most contract violations (out-of-range slots, writes to a frozen
//! descriptor) are debug assertions and never show up here. A missing host
//! node during root assembly is asserted in debug builds and reported as
//! [`RenderError::NoCurrentNode`] otherwise.

use thiserror::Error;

/// Result type for bootstrap operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors that can surface while bootstrapping a component.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A token could not be resolved and no injector in the chain provides it.
    #[error("No provider for {token}! (injector: {injector})")]
    ProviderNotFound { token: String, injector: String },

    /// A component asked for itself while it was being constructed.
    #[error("Circular dependency while instantiating {token}")]
    CyclicDependency { token: String },

    /// A selector-based host lookup found no element.
    #[error("no host element matches selector `{selector}`")]
    HostElementNotFound { selector: String },

    /// Root assembly ran without a current host node in the entered view.
    #[error("no host node is current; root components are assembled inside a creation pass")]
    NoCurrentNode,
}

impl RenderError {
    pub(crate) fn provider_not_found(token: impl Into<String>, injector: impl Into<String>) -> Self {
        Self::ProviderNotFound {
            token: token.into(),
            injector: injector.into(),
        }
    }
}
