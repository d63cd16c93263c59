//! Error types for the leave workflow.

use hr_graph::GraphError;
use langflow_client::LangflowError;
use thiserror::Error;

/// Result type for workflow operations.
pub type Result<T> = std::result::Result<T, HrAgentError>;

/// Errors surfaced by the leave workflow.
#[derive(Debug, Error)]
pub enum HrAgentError {
    /// Graph construction or execution failed
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The upstream client could not be created
    #[error(transparent)]
    Langflow(#[from] LangflowError),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request cannot be processed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Collecting an approval decision failed
    #[error("Approval failed: {0}")]
    Approval(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
