//! Leave workflow
//!
//! ```text
//!  START ─► privacy_check ─┬─ denied ──► finalize_denied ─► END
//!                          └─ allowed ─► call_agent ─┬─ failed ─► finalize ─► END
//!                                                    └─ ok ─► extract_data ─► check_threshold
//!                                                                 ┌─ auto ─────────┘   │
//!                                                                 ▼                    │ approval
//!                                                             finalize ◄── human_approval ◄┘
//! ```
//!
//! The graph pauses before `human_approval`. [`LeaveWorkflow::start`] returns
//! the paused run as a [`PendingApproval`]; [`LeaveWorkflow::resume`] applies
//! a decision and finishes it. [`LeaveWorkflow::run`] does both, asking the
//! configured [`ApprovalHandler`].

use crate::approval::{ApprovalDecision, ApprovalHandler, ApprovalRequest};
use crate::config::HrAgentConfig;
use crate::error::{HrAgentError, Result};
use crate::nodes::{
    self, route_agent, route_privacy, route_threshold, CALL_AGENT, CHECK_THRESHOLD, EXTRACT_DATA,
    FINALIZE, FINALIZE_DENIED, HUMAN_APPROVAL, PRIVACY_CHECK,
};
use crate::policy::ApprovalPolicy;
use crate::state::{ApprovalStatus, LeaveRequest, LeaveState};
use async_trait::async_trait;
use hr_graph::{
    executor, CompiledGraph, Execution, InterruptConfig, InterruptState, NodeSpec, StateGraph, END,
    START,
};
use langflow_client::{new_session_id, AgentBackend, AgentReply, LangflowClient, LangflowError};
use std::collections::HashMap;
use std::sync::Arc;

/// Build the leave graph around an upstream backend and approval policy.
pub fn build_graph(
    backend: Arc<dyn AgentBackend>,
    policy: ApprovalPolicy,
) -> hr_graph::Result<CompiledGraph<LeaveState>> {
    let mut graph = StateGraph::new();

    graph.add_node_spec(
        PRIVACY_CHECK,
        NodeSpec::new(PRIVACY_CHECK, executor(nodes::privacy_check))
            .with_description("deny other employees' records"),
    );
    graph.add_node(FINALIZE_DENIED, nodes::finalize_denied);
    graph.add_node(CALL_AGENT, move |state: LeaveState| {
        let backend = Arc::clone(&backend);
        async move { nodes::call_agent(state, backend).await }
    });
    graph.add_node(EXTRACT_DATA, nodes::extract_data);
    graph.add_node_spec(
        CHECK_THRESHOLD,
        NodeSpec::new(
            CHECK_THRESHOLD,
            executor(move |state: LeaveState| nodes::check_threshold(state, policy)),
        )
        .with_description(format!("more than {} days needs approval", policy.threshold_days)),
    );
    graph.add_node(HUMAN_APPROVAL, nodes::human_approval);
    graph.add_node(FINALIZE, nodes::finalize);

    graph.add_edge(START, PRIVACY_CHECK);
    graph.add_conditional_edge(
        PRIVACY_CHECK,
        route_privacy,
        HashMap::from([
            ("denied".to_string(), FINALIZE_DENIED.to_string()),
            ("allowed".to_string(), CALL_AGENT.to_string()),
        ]),
    );
    graph.add_edge(FINALIZE_DENIED, END);
    graph.add_conditional_edge(
        CALL_AGENT,
        route_agent,
        HashMap::from([
            ("failed".to_string(), FINALIZE.to_string()),
            ("ok".to_string(), EXTRACT_DATA.to_string()),
        ]),
    );
    graph.add_edge(EXTRACT_DATA, CHECK_THRESHOLD);
    graph.add_conditional_edge(
        CHECK_THRESHOLD,
        route_threshold,
        HashMap::from([
            ("approval".to_string(), HUMAN_APPROVAL.to_string()),
            ("auto".to_string(), FINALIZE.to_string()),
        ]),
    );
    graph.add_edge(HUMAN_APPROVAL, FINALIZE);
    graph.add_finish(FINALIZE);

    graph.compile_with_interrupts(
        InterruptConfig::new().with_interrupt_before(vec![HUMAN_APPROVAL.to_string()]),
    )
}

/// Mermaid diagram of the leave graph, without needing an upstream endpoint
pub fn diagram(policy: ApprovalPolicy) -> Result<String> {
    let graph = build_graph(Arc::new(Unconfigured), policy)?;
    Ok(graph.visualize_mermaid())
}

struct Unconfigured;

#[async_trait]
impl AgentBackend for Unconfigured {
    async fn query(&self, _message: &str, _session_id: &str) -> langflow_client::Result<AgentReply> {
        Err(LangflowError::Config("no upstream agent configured".into()))
    }
}

/// A run paused for a reviewer's decision
#[derive(Debug, Clone)]
pub struct PendingApproval {
    pub state: LeaveState,
    pub interrupt: InterruptState,
}

impl PendingApproval {
    /// What the reviewer is asked to decide on
    pub fn request(&self) -> ApprovalRequest {
        ApprovalRequest::from_state(&self.state)
    }
}

/// Result of [`LeaveWorkflow::start`]
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed(LeaveState),
    AwaitingApproval(PendingApproval),
}

/// The leave workflow wired to an upstream agent and a reviewer
pub struct LeaveWorkflow {
    graph: CompiledGraph<LeaveState>,
    approver: Arc<dyn ApprovalHandler>,
}

impl LeaveWorkflow {
    pub fn new(
        backend: Arc<dyn AgentBackend>,
        policy: ApprovalPolicy,
        approver: Arc<dyn ApprovalHandler>,
    ) -> Result<Self> {
        Ok(Self {
            graph: build_graph(backend, policy)?,
            approver,
        })
    }

    /// Workflow backed by the Langflow endpoint described in `config`
    pub fn from_config(config: &HrAgentConfig, approver: Arc<dyn ApprovalHandler>) -> Result<Self> {
        let client = LangflowClient::new(config.langflow.client_config())?;
        Self::new(Arc::new(client), config.approval.policy(), approver)
    }

    /// Run until the request completes or needs a reviewer.
    #[tracing::instrument(skip(self, request), fields(session_id = %request.session_id))]
    pub async fn start(&self, mut request: LeaveRequest) -> Result<RunOutcome> {
        if request.message.trim().is_empty() {
            return Err(HrAgentError::InvalidRequest("message is empty".into()));
        }
        if request.session_id.trim().is_empty() {
            request.session_id = new_session_id();
        }

        let execution = self.graph.run(LeaveState::new(request)).await?;
        tracing::info!(
            path = ?execution.path(),
            stage = %execution.state().stage,
            "Graph run returned"
        );

        match execution {
            Execution::Completed { state, .. } => Ok(RunOutcome::Completed(state)),
            Execution::Interrupted {
                state, interrupt, ..
            } => {
                tracing::info!(node = %interrupt.node, "Request awaiting approval");
                let interrupt = interrupt
                    .with_metadata("session_id", serde_json::json!(state.session_id))
                    .with_metadata("days_requested", serde_json::json!(state.days_requested));
                Ok(RunOutcome::AwaitingApproval(PendingApproval { state, interrupt }))
            }
        }
    }

    /// Apply a reviewer's decision and finish the run.
    #[tracing::instrument(skip(self, pending, decision), fields(session_id = %pending.state.session_id, approved = decision.approved))]
    pub async fn resume(
        &self,
        pending: PendingApproval,
        decision: ApprovalDecision,
    ) -> Result<LeaveState> {
        let PendingApproval {
            mut state,
            interrupt,
        } = pending;

        if state.approval_status != Some(ApprovalStatus::Pending) {
            return Err(HrAgentError::InvalidRequest(format!(
                "request is not awaiting approval (status: {})",
                state
                    .approval_status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "none".to_string())
            )));
        }

        state.approval_decision = Some(ApprovalDecision::new(decision.approved, decision.reason));

        match self.graph.resume(state, &interrupt).await? {
            Execution::Completed { state, .. } => Ok(state),
            Execution::Interrupted { interrupt, .. } => Err(HrAgentError::Graph(
                hr_graph::GraphError::interrupted(interrupt.node.clone(), interrupt.reason()),
            )),
        }
    }

    /// Run a request end to end, asking the approval handler when needed.
    pub async fn run(&self, request: LeaveRequest) -> Result<LeaveState> {
        match self.start(request).await? {
            RunOutcome::Completed(state) => Ok(state),
            RunOutcome::AwaitingApproval(pending) => {
                let decision = self.approver.decide(&pending.request()).await?;
                self.resume(pending, decision).await
            }
        }
    }

    pub fn visualize_mermaid(&self) -> String {
        self.graph.visualize_mermaid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_compiles() {
        let graph = build_graph(Arc::new(Unconfigured), ApprovalPolicy::default()).unwrap();
        assert!(graph.interrupt_config().should_interrupt_before(HUMAN_APPROVAL));
        assert_eq!(graph.graph().node_ids().len(), 7);
    }

    #[test]
    fn test_diagram_mentions_every_node() {
        let diagram = diagram(ApprovalPolicy::new(5)).unwrap();
        for node in [
            PRIVACY_CHECK,
            FINALIZE_DENIED,
            CALL_AGENT,
            EXTRACT_DATA,
            CHECK_THRESHOLD,
            HUMAN_APPROVAL,
            FINALIZE,
        ] {
            assert!(diagram.contains(node), "missing {}", node);
        }
        assert!(diagram.contains("more than 5 days needs approval"));
    }

    #[tokio::test]
    async fn test_unconfigured_backend_finishes_with_error_response() {
        let workflow = LeaveWorkflow::new(
            Arc::new(Unconfigured),
            ApprovalPolicy::default(),
            Arc::new(crate::approval::ScriptedApprovalHandler::default()),
        )
        .unwrap();

        let state = workflow
            .run(LeaveRequest::new("How many days do I have?", ""))
            .await
            .unwrap();

        assert!(!state.session_id.is_empty());
        assert!(state
            .agent_response
            .unwrap()
            .starts_with("Error: Failed to call Langflow API: Configuration error"));
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let workflow = LeaveWorkflow::new(
            Arc::new(Unconfigured),
            ApprovalPolicy::default(),
            Arc::new(crate::approval::ScriptedApprovalHandler::default()),
        )
        .unwrap();

        let err = workflow.start(LeaveRequest::new("   ", "s")).await.err().unwrap();
        assert!(matches!(err, HrAgentError::InvalidRequest(_)));
    }
}
