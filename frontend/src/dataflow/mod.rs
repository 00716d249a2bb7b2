//! Dataflow primitives for reactive state management
//!
//! The directory domain is built from three pieces:
//!
//! - **[`Relay`]** - typed event channel from the UI (or a spawned request) into an Actor
//! - **[`Actor`]** - single-value state owned by one sequential processing loop
//! - **[`ActorVec`]** - collection state owned by one processing loop
//!
//! Relays follow the `{source}_{event}_relay` naming pattern, e.g.
//! `filter_changed_relay` or `page_loaded_relay`. State is read through
//! signals; only the owning loop mutates it.

pub mod actor;
pub mod actor_vec;
pub mod relay;

pub use actor::Actor;
pub use actor_vec::ActorVec;
pub use relay::{Relay, relay};
