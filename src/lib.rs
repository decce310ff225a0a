//! # spark-view
//!
//! Root component bootstrap and change-detection scheduling for a
//! retained-mode view runtime.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals): every
//! root exposes a reactive flush counter so effects can follow its renders.
//!
//! ## Architecture
//!
//! Bootstrapping a component assembles a synthetic root view around it,
//! writes its static host styling, instantiates it through the dependency
//! injection chain and runs its first render. Later changes are coalesced
//! into one scheduled flush per root:
//! ```text
//! render_component → root view + component view → render_view → refresh_view
//! mark_dirty → schedule_tick → (scheduler) → tick_root_context → when_rendered resolves
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core types (flags, component instances, view layout constants)
//! - [`engine`] - Component definitions, static descriptors, view records, refresh
//! - [`component`] - Root view and root component assembly, bootstrap
//! - [`component_ref`] - Component factory and component handles
//! - [`root_context`] - Per-root state, animation players
//! - [`scheduler`] - Coalesced flushes and the completion signal
//! - [`di`] - Tokens and injectors
//! - [`renderer`] - Renderer contracts and the in-memory DOM
//! - [`styling`] - Static host attributes, classes and styles

pub mod component;
pub mod component_ref;
pub mod di;
pub mod engine;
pub mod error;
pub mod renderer;
pub mod root_context;
pub mod sanitization;
pub mod scheduler;
pub mod styling;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export commonly used items
pub use types::*;

pub use error::{RenderError, Result};

pub use component::{
    create_root_component, create_root_component_view, render_component, when_rendered,
    CreateComponentOptions, HostFeature, HostTarget,
};

pub use component_ref::{ComponentFactory, ComponentRef};

pub use root_context::{add_player, create_root_context, Player, PlayerHandler, RootContext};

pub use scheduler::{
    flush_animation_frame, pending_animation_frames, request_animation_frame,
    reset_animation_frames, schedule_tick, CleanPromise, Scheduler, Work,
};

pub use engine::{
    detect_changes, mark_dirty, reset_patch_data, reset_state, ComponentDef, LifecycleHooks,
    ViewRef,
};

pub use di::{Injector, NullInjector, Provider, StaticInjector, Token};

pub use renderer::{Document, DomRendererFactory, Element, RElement, Renderer, RendererFactory};

pub use sanitization::{Sanitizer, SecurityContext};

pub use styling::TAttributes;
