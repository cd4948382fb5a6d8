//! The value tree, visibility overlay, and `manageMemory` operation
//! executor — the stateful core the render and DB-bridge crates sit on top
//! of.

pub mod executor;
pub mod op;
pub mod topic_paths;
pub mod tree;
pub mod visibility;

pub use executor::{apply_batch, BatchOutcome};
pub use op::{Action, BatchInput, OpInput, OpResult, PageInput};
pub use visibility::{effective_visibility, MemoryState, Page};
