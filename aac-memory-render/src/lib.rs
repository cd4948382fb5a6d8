//! Renders the memory tree for the LLM's system prompt and declares the
//! `manageMemory` tool surface it's invited to call.

pub mod renderer;
pub mod tool;

pub use renderer::{render, RenderOptions};
pub use tool::{build_tool, Tool};
