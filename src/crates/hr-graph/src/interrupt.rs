//! Human-in-the-loop interrupts
//!
//! A compiled graph can be told to pause before or after specific nodes.
//! When execution reaches such a point, [`CompiledGraph::run`](crate::CompiledGraph::run)
//! returns [`Execution::Interrupted`](crate::Execution::Interrupted) carrying the
//! current state and an [`InterruptState`]. The caller collects whatever input it
//! needs (an approval, an edit), updates the state, and calls
//! [`CompiledGraph::resume`](crate::CompiledGraph::resume).
//!
//! ```text
//!   threshold_check ──► [interrupt before human_approval]
//!                                │  caller asks a human
//!                                ▼
//!                 resume(state', interrupt) ──► human_approval ──► finalize
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::graph::NodeId;

/// Configuration for graph interrupts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterruptConfig {
    /// Nodes to interrupt before execution
    pub interrupt_before: Vec<NodeId>,

    /// Nodes to interrupt after execution
    pub interrupt_after: Vec<NodeId>,
}

impl InterruptConfig {
    /// Create an empty interrupt configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set nodes to interrupt before
    pub fn with_interrupt_before(mut self, nodes: Vec<NodeId>) -> Self {
        self.interrupt_before = nodes;
        self
    }

    /// Set nodes to interrupt after
    pub fn with_interrupt_after(mut self, nodes: Vec<NodeId>) -> Self {
        self.interrupt_after = nodes;
        self
    }

    /// Check if should interrupt before a specific node
    pub fn should_interrupt_before(&self, node: &str) -> bool {
        self.interrupt_before.iter().any(|n| n == node)
    }

    /// Check if should interrupt after a specific node
    pub fn should_interrupt_after(&self, node: &str) -> bool {
        self.interrupt_after.iter().any(|n| n == node)
    }

    /// Every node named in this configuration
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.interrupt_before.iter().chain(self.interrupt_after.iter())
    }
}

/// When the interrupt occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterruptWhen {
    /// Interrupted before node execution
    Before,
    /// Interrupted after node execution
    After,
}

/// State of an interrupted execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterruptState {
    /// Unique ID for this interrupt
    pub interrupt_id: String,

    /// The node that caused the interrupt
    pub node: NodeId,

    /// Whether the interrupt occurred before or after the node
    pub when: InterruptWhen,

    /// Number of nodes executed when interrupted
    pub step: usize,

    /// Additional metadata
    pub metadata: HashMap<String, serde_json::Value>,

    /// Timestamp when interrupted
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl InterruptState {
    /// Create a new interrupt state
    pub fn new(node: NodeId, when: InterruptWhen, step: usize) -> Self {
        Self {
            interrupt_id: Uuid::new_v4().to_string(),
            node,
            when,
            step,
            metadata: HashMap::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Add metadata to the interrupt state
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Human readable reason, used when an interrupt is surfaced as an error
    pub fn reason(&self) -> String {
        match self.when {
            InterruptWhen::Before => format!("paused before '{}'", self.node),
            InterruptWhen::After => format!("paused after '{}'", self.node),
        }
    }
}
