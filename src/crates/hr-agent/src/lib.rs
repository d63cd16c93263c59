//! # hr-agent - Leave requests with guardrails and human approval
//!
//! Routes an employee's message through a small state graph:
//!
//! 1. a privacy guardrail denies questions about other employees,
//! 2. the Langflow agent answers and reports leave details,
//! 3. the details are extracted (structured JSON, else a text scan),
//! 4. requests above the approval threshold pause for a reviewer,
//! 5. the final response is composed.
//!
//! ```rust,ignore
//! use hr_agent::{load_config, ConsoleApprovalHandler, LeaveRequest, LeaveWorkflow};
//! use std::sync::Arc;
//!
//! let config = load_config(None).await?;
//! let workflow = LeaveWorkflow::from_config(&config, Arc::new(ConsoleApprovalHandler::stdio()))?;
//! let state = workflow
//!     .run(LeaveRequest::new("I need 10 days off in December", "").with_employee_id("EMP12345"))
//!     .await?;
//! println!("{}", state.agent_response.unwrap_or_default());
//! ```

pub mod approval;
pub mod config;
pub mod demo;
pub mod error;
pub mod nodes;
pub mod policy;
pub mod privacy;
pub mod state;
pub mod workflow;

pub use approval::{
    prompt_decision, ApprovalDecision, ApprovalHandler, ApprovalRequest, ConsoleApprovalHandler,
    ScriptedApprovalHandler, SharedInput, SharedOutput, NO_REASON,
};
pub use config::{load_config, ConfigLoader, HrAgentConfig, LoggingConfig};
pub use demo::{DemoScenario, DEMO_SCENARIOS, EXAMPLE_QUERIES};
pub use error::{HrAgentError, Result};
pub use policy::{ApprovalPolicy, DEFAULT_THRESHOLD_DAYS};
pub use privacy::{check_privacy, PrivacyVerdict};
pub use state::{ApprovalStatus, LeaveRequest, LeaveState, LeaveType, WorkflowStage};
pub use workflow::{build_graph, diagram, LeaveWorkflow, PendingApproval, RunOutcome};
