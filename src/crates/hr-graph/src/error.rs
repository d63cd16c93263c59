//! Error types for graph construction and execution
//!
//! All errors implement `std::error::Error` via `thiserror`.
//!
//! ```text
//! GraphError
//! ├── Validation         - Graph structure errors found by compile()
//! ├── NodeExecution      - A node returned an error
//! ├── Execution          - Routing or engine failures
//! ├── Interrupted        - Human-in-the-loop pause surfaced through invoke()
//! ├── StateError         - Illegal state mutation (e.g. stage transition)
//! ├── RecursionLimit     - Step budget exhausted
//! ├── Serialization      - JSON errors
//! └── Custom             - Application-defined errors
//! ```
//!
//! # Matching Specific Errors
//!
//! ```rust
//! use hr_graph::error::GraphError;
//!
//! fn describe(err: &GraphError) -> String {
//!     match err {
//!         GraphError::Interrupted { node, reason } => {
//!             format!("Paused at {}: {}", node, reason)
//!         }
//!         GraphError::NodeExecution { node, error } => {
//!             format!("Failed at {}: {}", node, error)
//!         }
//!         other => format!("Error: {}", other),
//!     }
//! }
//!
//! let err = GraphError::interrupted("human_approval", "approval required");
//! assert_eq!(describe(&err), "Paused at human_approval: approval required");
//! ```

use thiserror::Error;

/// Convenience result type using [`GraphError`]
pub type Result<T> = std::result::Result<T, GraphError>;

/// Error type for all graph operations
#[derive(Error, Debug)]
pub enum GraphError {
    /// Graph structure validation failed
    ///
    /// Raised by `compile()` when a referenced node does not exist, a node has
    /// no outgoing edge, or a node has more than one outgoing edge spec.
    #[error("Graph validation failed: {0}")]
    Validation(String),

    /// Node execution failed with context
    ///
    /// ```rust
    /// use hr_graph::error::GraphError;
    ///
    /// let err = GraphError::node_execution("call_agent", "upstream timeout");
    /// assert_eq!(format!("{}", err), "Node 'call_agent' execution failed: upstream timeout");
    /// ```
    #[error("Node '{node}' execution failed: {error}")]
    NodeExecution {
        /// Name of the node that failed
        node: String,
        /// Error message from node execution
        error: String,
    },

    /// Engine-level execution error without node context
    #[error("Execution failed: {0}")]
    Execution(String),

    /// Graph execution interrupted (human-in-the-loop)
    ///
    /// Only produced by [`CompiledGraph::invoke`](crate::CompiledGraph::invoke);
    /// [`CompiledGraph::run`](crate::CompiledGraph::run) reports interrupts as a
    /// normal [`Execution::Interrupted`](crate::Execution::Interrupted) outcome.
    #[error("Graph execution interrupted at node '{node}': {reason}")]
    Interrupted {
        /// Node where execution was interrupted
        node: String,
        /// Reason for the interrupt
        reason: String,
    },

    /// State management error with optional node context
    #[error("State error{}: {error}", node.as_ref().map(|n| format!(" in node '{}'", n)).unwrap_or_default())]
    StateError {
        /// Optional node context where error occurred
        node: Option<String>,
        /// Error description
        error: String,
    },

    /// The graph took more steps than allowed
    #[error("Recursion limit of {limit} steps reached without hitting END")]
    RecursionLimit {
        /// Configured step limit
        limit: usize,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Custom application-defined error
    #[error("{0}")]
    Custom(String),
}

impl GraphError {
    /// Create a node execution error with context
    pub fn node_execution(node: impl Into<String>, error: impl Into<String>) -> Self {
        Self::NodeExecution {
            node: node.into(),
            error: error.into(),
        }
    }

    /// Create a state error with optional node context
    ///
    /// ```rust
    /// use hr_graph::error::GraphError;
    ///
    /// let err = GraphError::state_error(Some("extract_data"), "stage cannot go backwards");
    /// assert_eq!(
    ///     err.to_string(),
    ///     "State error in node 'extract_data': stage cannot go backwards"
    /// );
    ///
    /// let err = GraphError::state_error(None::<String>, "empty message");
    /// assert_eq!(err.to_string(), "State error: empty message");
    /// ```
    pub fn state_error(node: Option<impl Into<String>>, error: impl Into<String>) -> Self {
        Self::StateError {
            node: node.map(|n| n.into()),
            error: error.into(),
        }
    }

    /// Create an interrupted error
    pub fn interrupted(node: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Interrupted {
            node: node.into(),
            reason: reason.into(),
        }
    }

    /// Attach node context to an error raised inside a node.
    ///
    /// Errors that already carry a node are returned unchanged; a `StateError`
    /// without a node gains one; everything else becomes `NodeExecution`.
    pub(crate) fn in_node(self, node: &str) -> Self {
        match self {
            e @ (GraphError::NodeExecution { .. }
            | GraphError::Interrupted { .. }
            | GraphError::StateError { node: Some(_), .. }) => e,
            GraphError::StateError { node: None, error } => GraphError::StateError {
                node: Some(node.to_string()),
                error,
            },
            other => GraphError::node_execution(node, other.to_string()),
        }
    }
}
