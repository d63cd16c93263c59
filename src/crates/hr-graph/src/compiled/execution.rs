//! Graph execution methods (run, resume, invoke)
//!
//! Nodes execute one at a time. After each node the single outgoing edge is
//! resolved against the updated state; a conditional edge calls its router and
//! looks the returned key up in its branch map.

use super::CompiledGraph;
use crate::error::{GraphError, Result};
use crate::graph::{Edge, NodeId, END, START};
use crate::interrupt::{InterruptState, InterruptWhen};

/// Outcome of a [`CompiledGraph::run`] or [`CompiledGraph::resume`] call
#[derive(Debug, Clone)]
pub enum Execution<S> {
    /// Execution reached [`END`]
    Completed {
        /// Final state
        state: S,
        /// Nodes executed during this call, in order
        path: Vec<NodeId>,
    },

    /// Execution paused at an interrupt point
    Interrupted {
        /// State at the pause
        state: S,
        /// Where and when execution paused
        interrupt: InterruptState,
        /// Nodes executed during this call, in order
        path: Vec<NodeId>,
    },
}

impl<S> Execution<S> {
    /// State carried by the outcome
    pub fn state(&self) -> &S {
        match self {
            Execution::Completed { state, .. } | Execution::Interrupted { state, .. } => state,
        }
    }

    /// Consume the outcome, keeping the state
    pub fn into_state(self) -> S {
        match self {
            Execution::Completed { state, .. } | Execution::Interrupted { state, .. } => state,
        }
    }

    /// Nodes executed during the call that produced this outcome
    pub fn path(&self) -> &[NodeId] {
        match self {
            Execution::Completed { path, .. } | Execution::Interrupted { path, .. } => path,
        }
    }

    /// True when execution paused
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Execution::Interrupted { .. })
    }
}

impl<S> CompiledGraph<S>
where
    S: Send + 'static,
{
    /// Execute the graph to completion.
    ///
    /// Interrupt points surface as [`GraphError::Interrupted`]; use
    /// [`run`](Self::run) to handle them as a normal outcome.
    pub async fn invoke(&self, input: S) -> Result<S> {
        match self.run(input).await? {
            Execution::Completed { state, .. } => Ok(state),
            Execution::Interrupted { interrupt, .. } => {
                Err(GraphError::interrupted(interrupt.node.clone(), interrupt.reason()))
            }
        }
    }

    /// Execute the graph from its entry point.
    ///
    /// Returns [`Execution::Interrupted`] when a configured interrupt point is
    /// reached, otherwise [`Execution::Completed`] once [`END`] is reached.
    #[tracing::instrument(skip(self, input), fields(node_count = self.graph.nodes.len()))]
    pub async fn run(&self, input: S) -> Result<Execution<S>> {
        tracing::info!("Starting graph execution");

        let first = if self.graph.entry == START {
            self.next_node(START, &input)?
        } else {
            self.graph.entry.clone()
        };

        self.execute(input, first, 0, None).await
    }

    /// Continue an interrupted execution.
    ///
    /// `state` is the (possibly edited) state returned with the interrupt. A
    /// before-interrupt runs the interrupted node next without pausing on it
    /// again; an after-interrupt resolves the node's outgoing edge against
    /// `state` and continues from there.
    #[tracing::instrument(skip(self, state, interrupt), fields(node = %interrupt.node, when = ?interrupt.when))]
    pub async fn resume(&self, state: S, interrupt: &InterruptState) -> Result<Execution<S>> {
        if !self.graph.nodes.contains_key(&interrupt.node) {
            return Err(GraphError::Execution(format!(
                "Cannot resume: node {} is not part of this graph",
                interrupt.node
            )));
        }

        tracing::info!("Resuming graph execution");

        match interrupt.when {
            InterruptWhen::Before => {
                self.execute(
                    state,
                    interrupt.node.clone(),
                    interrupt.step,
                    Some(interrupt.node.clone()),
                )
                .await
            }
            InterruptWhen::After => {
                let next = self.next_node(&interrupt.node, &state)?;
                self.execute(state, next, interrupt.step, None).await
            }
        }
    }

    async fn execute(
        &self,
        mut state: S,
        start: NodeId,
        mut step: usize,
        mut skip_interrupt_before: Option<NodeId>,
    ) -> Result<Execution<S>> {
        let mut current = start;
        let mut path = Vec::new();

        loop {
            if current == END {
                tracing::info!(steps = step, "Graph execution completed successfully");
                return Ok(Execution::Completed { state, path });
            }

            if step >= self.recursion_limit {
                tracing::error!(limit = self.recursion_limit, "Recursion limit reached");
                return Err(GraphError::RecursionLimit {
                    limit: self.recursion_limit,
                });
            }

            let resuming_here = skip_interrupt_before.take().as_deref() == Some(current.as_str());
            if !resuming_here && self.interrupt_config.should_interrupt_before(&current) {
                tracing::info!(node = %current, step, "Interrupting before node");
                let interrupt = InterruptState::new(current, InterruptWhen::Before, step);
                return Ok(Execution::Interrupted {
                    state,
                    interrupt,
                    path,
                });
            }

            let spec = self.graph.nodes.get(&current).ok_or_else(|| {
                GraphError::Execution(format!("Node {} does not exist", current))
            })?;

            tracing::debug!(node = %current, step, "Executing node");
            state = (spec.executor)(state).await.map_err(|e| {
                let e = e.in_node(&current);
                tracing::error!(node = %current, error = %e, "Node execution failed");
                e
            })?;
            path.push(current.clone());
            step += 1;

            if self.interrupt_config.should_interrupt_after(&current) {
                tracing::info!(node = %current, step, "Interrupting after node");
                let interrupt = InterruptState::new(current, InterruptWhen::After, step);
                return Ok(Execution::Interrupted {
                    state,
                    interrupt,
                    path,
                });
            }

            current = self.next_node(&current, &state)?;
        }
    }

    fn next_node(&self, node: &str, state: &S) -> Result<NodeId> {
        match self.graph.edge_from(node) {
            None => Err(GraphError::Execution(format!(
                "Node {} has no outgoing edge",
                node
            ))),
            Some(Edge::Direct(to)) => Ok(to.clone()),
            Some(Edge::Conditional { router, branches }) => {
                let key = router(state);
                tracing::debug!(from = node, branch = %key, "Routing conditional edge");
                branches.get(&key).cloned().ok_or_else(|| {
                    GraphError::Execution(format!(
                        "Router for {} returned unknown branch '{}'",
                        node, key
                    ))
                })
            }
        }
    }
}
