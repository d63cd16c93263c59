//! StateGraph builder
//!
//! [`StateGraph`] is the primary API for assembling a workflow. Nodes are async
//! closures that take the typed state by value and return the updated state;
//! edges are either direct or conditional.
//!
//! # Example
//!
//! ```rust
//! use hr_graph::{StateGraph, END, START};
//! use std::collections::HashMap;
//!
//! #[derive(Clone, Default)]
//! struct Ticket {
//!     priority: u8,
//!     escalated: bool,
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut graph = StateGraph::new();
//!
//! graph.add_node("triage", |ticket: Ticket| async move { Ok(ticket) });
//! graph.add_node("escalate", |mut ticket: Ticket| async move {
//!     ticket.escalated = true;
//!     Ok(ticket)
//! });
//!
//! graph.add_edge(START, "triage");
//! graph.add_conditional_edge(
//!     "triage",
//!     |ticket: &Ticket| if ticket.priority > 3 { "high" } else { "low" }.to_string(),
//!     HashMap::from([
//!         ("high".to_string(), "escalate".to_string()),
//!         ("low".to_string(), END.to_string()),
//!     ]),
//! );
//! graph.add_finish("escalate");
//!
//! let compiled = graph.compile()?;
//! let result = compiled.invoke(Ticket { priority: 5, escalated: false }).await?;
//! assert!(result.escalated);
//! # Ok(())
//! # }
//! ```

use crate::compiled::CompiledGraph;
use crate::error::{GraphError, Result};
use crate::graph::{executor, Graph, NodeId, NodeSpec, END, START};
use crate::interrupt::InterruptConfig;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Builder for typed state graphs
pub struct StateGraph<S> {
    graph: Graph<S>,
}

impl<S> StateGraph<S>
where
    S: Send + 'static,
{
    /// Creates an empty state graph builder
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
        }
    }

    /// Adds a processing node
    ///
    /// The executor receives the current state and returns the updated state.
    /// Returning an error stops the run; the engine attaches the node name.
    pub fn add_node<F, Fut>(&mut self, id: impl Into<NodeId>, node: F) -> &mut Self
    where
        F: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<S>> + Send + 'static,
    {
        let id = id.into();
        let spec = NodeSpec::new(id.clone(), executor(node));
        self.graph.add_node(id, spec);
        self
    }

    /// Add a node with full specification
    pub fn add_node_spec(&mut self, id: impl Into<NodeId>, spec: NodeSpec<S>) -> &mut Self {
        self.graph.add_node(id.into(), spec);
        self
    }

    /// Adds a directed edge between two nodes
    ///
    /// Use [`START`] as the source for the entry edge and [`END`] as the target
    /// for terminal nodes.
    pub fn add_edge(&mut self, from: impl Into<NodeId>, to: impl Into<NodeId>) -> &mut Self {
        self.graph.add_edge(from.into(), to.into());
        self
    }

    /// Add a conditional edge that routes based on state
    ///
    /// # Arguments
    ///
    /// * `from` - Source node ID
    /// * `router` - Returns a branch key for the current state
    /// * `branches` - Map of branch keys to node IDs
    pub fn add_conditional_edge<F>(
        &mut self,
        from: impl Into<NodeId>,
        router: F,
        branches: HashMap<String, NodeId>,
    ) -> &mut Self
    where
        F: Fn(&S) -> String + Send + Sync + 'static,
    {
        self.graph
            .add_conditional_edge(from.into(), Arc::new(router), branches);
        self
    }

    /// Set the entry point of the graph
    ///
    /// Also adds the edge from [`START`] so the node is triggered first.
    pub fn set_entry(&mut self, node: impl Into<NodeId>) -> &mut Self {
        let node_id = node.into();
        self.graph.set_entry(node_id.clone());
        self.add_edge(START, node_id);
        self
    }

    /// Add a finish point (edge to END)
    pub fn add_finish(&mut self, node: impl Into<NodeId>) -> &mut Self {
        self.graph.add_edge(node.into(), END.to_string());
        self
    }

    /// Compiles the graph into an executable form
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Validation`] if the graph structure is invalid.
    pub fn compile(self) -> Result<CompiledGraph<S>> {
        self.compile_with_interrupts(InterruptConfig::default())
    }

    /// Compile the graph with interrupt configuration
    ///
    /// Every node named in `interrupt_config` must exist.
    pub fn compile_with_interrupts(self, interrupt_config: InterruptConfig) -> Result<CompiledGraph<S>> {
        self.graph.validate().map_err(GraphError::Validation)?;

        if let Some(missing) = interrupt_config
            .nodes()
            .find(|node| !self.graph.nodes.contains_key(*node))
        {
            return Err(GraphError::Validation(format!(
                "Interrupt node {} does not exist",
                missing
            )));
        }

        Ok(CompiledGraph::new(self.graph, interrupt_config))
    }

    /// Get a reference to the underlying graph
    pub fn graph(&self) -> &Graph<S> {
        &self.graph
    }
}

impl<S> Default for StateGraph<S>
where
    S: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
