//! # hr-graph - Typed state graphs with human-in-the-loop interrupts
//!
//! A small workflow engine: nodes are async functions over a typed state,
//! edges are direct or conditional, and execution can pause before or after
//! chosen nodes so a person can weigh in.
//!
//! ## Core Concepts
//!
//! - [`StateGraph`] builds the graph; `compile()` validates it.
//! - [`CompiledGraph::run`] executes one node at a time from [`START`] until
//!   [`END`], returning an [`Execution`].
//! - [`InterruptConfig`] names the nodes to pause at; a paused run is continued
//!   with [`CompiledGraph::resume`].
//! - [`CompiledGraph::visualize_mermaid`] renders the structure.
//!
//! ## Quick Start
//!
//! ```rust
//! use hr_graph::{Execution, InterruptConfig, StateGraph, END, START};
//!
//! #[derive(Debug, Clone, Default)]
//! struct Request {
//!     amount: u32,
//!     approved: bool,
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut graph = StateGraph::new();
//! graph.add_node("approve", |mut req: Request| async move {
//!     req.approved = true;
//!     Ok(req)
//! });
//! graph.add_edge(START, "approve");
//! graph.add_edge("approve", END);
//!
//! let compiled = graph.compile_with_interrupts(
//!     InterruptConfig::new().with_interrupt_before(vec!["approve".to_string()]),
//! )?;
//!
//! let interrupt = match compiled.run(Request { amount: 10, approved: false }).await? {
//!     Execution::Interrupted { interrupt, .. } => interrupt,
//!     Execution::Completed { .. } => unreachable!(),
//! };
//!
//! let done = compiled.resume(Request { amount: 10, approved: false }, &interrupt).await?;
//! assert!(done.state().approved);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod compiled;
pub mod error;
pub mod graph;
pub mod interrupt;
pub mod visualization;

pub use builder::StateGraph;
pub use compiled::{CompiledGraph, Execution, DEFAULT_RECURSION_LIMIT};
pub use error::{GraphError, Result};
pub use graph::{executor, Edge, Graph, NodeExecutor, NodeId, NodeSpec, RouterFn, END, START};
pub use interrupt::{InterruptConfig, InterruptState, InterruptWhen};
