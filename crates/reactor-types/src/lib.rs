//! Shared types for the order reactor workspace.
//!
//! Every other crate speaks in terms of these types: the canonical resolved
//! order produced by resolvers, the persistent cross-chain settlement record,
//! and the events emitted by the reactor and the settler.

pub mod common;
pub mod events;
pub mod order;
pub mod settlement;

pub use common::*;
pub use events::*;
pub use order::*;
pub use settlement::*;
