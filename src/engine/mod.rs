//! View Engine - Static descriptors, view records and change detection.
//!
//! The engine manages the core data structures:
//! - ComponentDef: Static metadata of a component type
//! - StaticViewDescriptor: Per-template blueprint, frozen after its first creation pass
//! - NodeDescriptor: Static data of one node (attributes, styling, directive range)
//! - ViewRecord: One instantiated view (header + declaration slots)
//! - Instruction state: The stack of entered views
//! - Refresh: Creation and update passes, dirty marking
//!
//! # Architecture
//!
//! Static data is shared by every instance of a template; per-instance data
//! lives in view records addressed by absolute slot indices:
//!
//! ```text
//! StaticViewDescriptor ─────────────► [header][#host node][directive def]
//!        ▲ shared
//! ViewRecord (root) ────────────────► [header][component view][instance]
//!                                              │
//!                                              ▼
//!                              ViewRecord (component, context = instance)
//! ```

mod context;
mod def;
mod hooks;
mod refresh;
mod shared;
mod state;
mod tnode;
mod tview;
mod view;

pub use context::*;
pub use def::*;
pub use hooks::*;
pub use refresh::*;
pub use shared::*;
pub use state::*;
pub use tnode::*;
pub use tview::*;
pub use view::*;
