//! CompiledGraph struct and builder methods

use crate::graph::Graph;
use crate::interrupt::InterruptConfig;
use crate::visualization;

/// Default maximum number of node executions per run
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

/// Compiled graph ready for execution
pub struct CompiledGraph<S> {
    pub(crate) graph: Graph<S>,
    pub(crate) interrupt_config: InterruptConfig,
    pub(crate) recursion_limit: usize,
}

impl<S> Clone for CompiledGraph<S> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            interrupt_config: self.interrupt_config.clone(),
            recursion_limit: self.recursion_limit,
        }
    }
}

impl<S> CompiledGraph<S> {
    pub(crate) fn new(graph: Graph<S>, interrupt_config: InterruptConfig) -> Self {
        Self {
            graph,
            interrupt_config,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    /// Override the step limit
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Render the graph as a Mermaid flowchart
    pub fn visualize_mermaid(&self) -> String {
        visualization::mermaid(&self.graph, &self.interrupt_config)
    }

    /// Get a reference to the underlying graph
    pub fn graph(&self) -> &Graph<S> {
        &self.graph
    }

    /// Get the interrupt configuration
    pub fn interrupt_config(&self) -> &InterruptConfig {
        &self.interrupt_config
    }

    /// Get the step limit
    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }
}
