//! Core graph data structures
//!
//! A [`Graph`] stores nodes, the edges leaving each node, and the entry point.
//! It is normally built through [`StateGraph`](crate::StateGraph), which
//! validates the structure on `compile()`.
//!
//! ```text
//!  START ──► privacy_check ──┬─ denied ──► finalize_denied ──► END
//!                            └─ allowed ─► call_agent ──► ...
//! ```
//!
//! # Examples
//!
//! ```rust
//! use hr_graph::graph::{executor, Graph, NodeSpec, START, END};
//!
//! let mut graph: Graph<u32> = Graph::new();
//! graph.add_node(
//!     "double".to_string(),
//!     NodeSpec::new("double", executor(|n: u32| async move { Ok(n * 2) })),
//! );
//! graph.add_edge(START.to_string(), "double".to_string());
//! graph.add_edge("double".to_string(), END.to_string());
//!
//! assert!(graph.validate().is_ok());
//! ```

use crate::error::Result;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Node identifier - unique name for each node in the graph
pub type NodeId = String;

/// Virtual node marking where execution begins
pub const START: &str = "__start__";

/// Virtual node marking successful completion
pub const END: &str = "__end__";

/// Boxed future returned by node executors
pub type NodeFuture<S> = Pin<Box<dyn Future<Output = Result<S>> + Send>>;

/// Node executor: takes ownership of the state and returns the updated state
pub type NodeExecutor<S> = Arc<dyn Fn(S) -> NodeFuture<S> + Send + Sync>;

/// Router for conditional edges: inspects the state and returns a branch key
pub type RouterFn<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// Box an async closure into a [`NodeExecutor`]
pub fn executor<S, F, Fut>(f: F) -> NodeExecutor<S>
where
    F: Fn(S) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<S>> + Send + 'static,
{
    Arc::new(move |state| Box::pin(f(state)) as NodeFuture<S>)
}

/// Edge type defining transitions between nodes
pub enum Edge<S> {
    /// Unconditional edge to a specific node
    Direct(NodeId),

    /// Conditional edge with dynamic routing
    Conditional {
        /// Returns the branch key for the current state
        router: RouterFn<S>,

        /// Map of branch keys to target nodes
        ///
        /// Used both at runtime to resolve the router's key and at compile
        /// time to check that every possible target exists.
        branches: HashMap<String, NodeId>,
    },
}

impl<S> Clone for Edge<S> {
    fn clone(&self) -> Self {
        match self {
            Edge::Direct(to) => Edge::Direct(to.clone()),
            Edge::Conditional { router, branches } => Edge::Conditional {
                router: router.clone(),
                branches: branches.clone(),
            },
        }
    }
}

impl<S> std::fmt::Debug for Edge<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Edge::Direct(node_id) => f.debug_tuple("Direct").field(node_id).finish(),
            Edge::Conditional { branches, .. } => f
                .debug_struct("Conditional")
                .field("router", &"<function>")
                .field("branches", branches)
                .finish(),
        }
    }
}

impl<S> Edge<S> {
    /// All nodes this edge can lead to, sorted for stable output
    pub fn targets(&self) -> Vec<&NodeId> {
        match self {
            Edge::Direct(to) => vec![to],
            Edge::Conditional { branches, .. } => {
                let mut targets: Vec<&NodeId> = branches.values().collect();
                targets.sort();
                targets.dedup();
                targets
            }
        }
    }
}

/// Node specification
pub struct NodeSpec<S> {
    /// Node name
    pub name: String,

    /// Async function that transforms the state
    pub executor: NodeExecutor<S>,

    /// Free-form description shown in diagrams
    pub description: Option<String>,
}

impl<S> NodeSpec<S> {
    /// Create a node specification
    pub fn new(name: impl Into<String>, executor: NodeExecutor<S>) -> Self {
        Self {
            name: name.into(),
            executor,
            description: None,
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl<S> Clone for NodeSpec<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            executor: self.executor.clone(),
            description: self.description.clone(),
        }
    }
}

impl<S> std::fmt::Debug for NodeSpec<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeSpec")
            .field("name", &self.name)
            .field("executor", &"<function>")
            .field("description", &self.description)
            .finish()
    }
}

/// Core graph structure containing nodes and edges
///
/// Typically built through [`StateGraph`](crate::StateGraph).
///
/// # Structure
///
/// - **nodes**: map of node IDs to [`NodeSpec`] definitions
/// - **edges**: map of source nodes to their outgoing [`Edge`]s
/// - **entry**: the entry point (usually [`START`])
#[derive(Debug)]
pub struct Graph<S> {
    /// All nodes mapped by their unique IDs
    pub nodes: HashMap<NodeId, NodeSpec<S>>,

    /// Outgoing edges per source node
    ///
    /// Stored as a list so duplicate edge declarations can be reported by
    /// [`validate`](Self::validate) instead of silently replacing each other.
    pub edges: HashMap<NodeId, Vec<Edge<S>>>,

    /// Entry point node ID
    pub entry: NodeId,
}

impl<S> Clone for Graph<S> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            entry: self.entry.clone(),
        }
    }
}

impl<S> Graph<S> {
    /// Create a new empty graph whose entry point is [`START`]
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            entry: START.to_string(),
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, id: NodeId, spec: NodeSpec<S>) {
        self.nodes.insert(id, spec);
    }

    /// Add a direct (unconditional) edge between two nodes
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.edges.entry(from).or_default().push(Edge::Direct(to));
    }

    /// Add a conditional edge with dynamic routing
    pub fn add_conditional_edge(
        &mut self,
        from: NodeId,
        router: RouterFn<S>,
        branches: HashMap<String, NodeId>,
    ) {
        self.edges
            .entry(from)
            .or_default()
            .push(Edge::Conditional { router, branches });
    }

    /// Set the entry point for graph execution
    pub fn set_entry(&mut self, node: NodeId) {
        self.entry = node;
    }

    /// The single outgoing edge of a node, if any
    pub fn edge_from(&self, node: &str) -> Option<&Edge<S>> {
        self.edges.get(node).and_then(|edges| edges.first())
    }

    /// Node IDs in sorted order
    pub fn node_ids(&self) -> Vec<&NodeId> {
        let mut ids: Vec<&NodeId> = self.nodes.keys().collect();
        ids.sort();
        ids
    }

    /// Validate the graph structure for correctness
    ///
    /// Checks that:
    /// - the entry point exists (or is [`START`] with an outgoing edge)
    /// - every edge source and target exists ([`START`] may be a source,
    ///   [`END`] may be a target)
    /// - every node and [`START`] has exactly one outgoing edge declaration
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found. Nodes are checked in
    /// sorted order so the message is deterministic.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.entry != START && !self.nodes.contains_key(&self.entry) {
            return Err(format!("Entry point {} does not exist", self.entry));
        }

        if self.nodes.is_empty() {
            return Err("Graph has no nodes".to_string());
        }

        let mut sources: Vec<&NodeId> = self.edges.keys().collect();
        sources.sort();

        for from in sources {
            if from != START && !self.nodes.contains_key(from) {
                return Err(format!("Edge source {} does not exist", from));
            }

            let edges = &self.edges[from];
            if edges.len() > 1 {
                return Err(format!(
                    "Node {} has {} outgoing edge declarations, expected one",
                    from,
                    edges.len()
                ));
            }

            for edge in edges {
                match edge {
                    Edge::Direct(to) => {
                        if to != END && !self.nodes.contains_key(to) {
                            return Err(format!("Edge target {} does not exist", to));
                        }
                    }
                    Edge::Conditional { branches, .. } => {
                        if branches.is_empty() {
                            return Err(format!("Conditional edge from {} has no branches", from));
                        }
                        let mut keys: Vec<&String> = branches.keys().collect();
                        keys.sort();
                        for key in keys {
                            let to = &branches[key];
                            if to != END && !self.nodes.contains_key(to) {
                                return Err(format!("Branch target {} does not exist", to));
                            }
                        }
                    }
                }
            }
        }

        if self.entry == START && !self.edges.contains_key(START) {
            return Err(format!("No edge leaves {}", START));
        }

        for id in self.node_ids() {
            if !self.edges.contains_key(id) {
                return Err(format!("Node {} has no outgoing edge", id));
            }
        }

        Ok(())
    }
}

impl<S> Default for Graph<S> {
    fn default() -> Self {
        Self::new()
    }
}
