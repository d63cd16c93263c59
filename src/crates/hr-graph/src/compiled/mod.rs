//! Compiled graph execution
//!
//! - `graph`: the [`CompiledGraph`] type and accessors
//! - `execution`: `run`, `resume` and `invoke`

mod execution;
mod graph;

pub use execution::Execution;
pub use graph::{CompiledGraph, DEFAULT_RECURSION_LIMIT};
