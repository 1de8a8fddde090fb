//! Shared types for the vortex particle field.

mod types;

pub use types::{SlotId, Span, UP, splitmix64};
