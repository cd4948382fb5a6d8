//! The optional DB bridge (§4.J): binds individual schema fields to a real
//! store, populates bound paths into the tree before render, and mirrors
//! mutations back out after the executor accepts them. A tree with no
//! bindings behaves exactly as if this crate weren't linked in.

pub mod binding;
pub mod bridge;
pub mod context;
pub mod load_state;

pub use binding::{DbBinding, DbPage};
pub use bridge::DbBridge;
pub use context::DbContext;
pub use load_state::LoadState;
