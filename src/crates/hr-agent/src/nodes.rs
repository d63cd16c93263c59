//! Workflow nodes and routers
//!
//! Each node takes the [`LeaveState`] by value, updates it and hands it back.
//! Routers inspect the state after a node has run and name the branch to take.

use crate::policy::ApprovalPolicy;
use crate::privacy::{check_privacy, PrivacyVerdict};
use crate::state::{ApprovalStatus, LeaveState, WorkflowStage};
use hr_graph::{GraphError, Result};
use langflow_client::{scan_text, AgentBackend};
use std::sync::Arc;

pub const PRIVACY_CHECK: &str = "privacy_check";
pub const FINALIZE_DENIED: &str = "finalize_denied";
pub const CALL_AGENT: &str = "call_agent";
pub const EXTRACT_DATA: &str = "extract_data";
pub const CHECK_THRESHOLD: &str = "check_threshold";
pub const HUMAN_APPROVAL: &str = "human_approval";
pub const FINALIZE: &str = "finalize";

/// Shown when the upstream agent cannot be reached
pub const UPSTREAM_FAILURE_RESPONSE: &str = "I encountered an error processing your request.";

/// Appended to auto-approved leave requests
pub const AUTO_APPROVED_SUFFIX: &str = "Your request has been automatically approved.";

/// Deny messages that reference another employee's id.
pub async fn privacy_check(mut state: LeaveState) -> Result<LeaveState> {
    match check_privacy(&state.message, state.employee_id.as_deref()) {
        PrivacyVerdict::Allowed => {
            state.advance(WorkflowStage::CallingUpstream)?;
        }
        PrivacyVerdict::Denied { referenced, reason } => {
            tracing::warn!(
                session_id = %state.session_id,
                referenced = ?referenced,
                "Request denied by privacy guardrail"
            );
            state.denial_reason = Some(reason);
            state.advance(WorkflowStage::Denied)?;
        }
    }
    Ok(state)
}

/// Terminal step for denied requests.
pub async fn finalize_denied(mut state: LeaveState) -> Result<LeaveState> {
    state.agent_response = state.denial_reason.clone();
    Ok(state)
}

/// Ask the upstream agent.
///
/// Failures are recorded on the state rather than aborting the run so the
/// user still receives a response.
pub async fn call_agent(mut state: LeaveState, backend: Arc<dyn AgentBackend>) -> Result<LeaveState> {
    match backend.query(&state.message, &state.session_id).await {
        Ok(reply) => {
            state.agent_response = Some(reply.response.clone());
            state.agent_reply = Some(reply);
        }
        Err(e) => {
            tracing::error!(session_id = %state.session_id, error = %e, "Upstream agent call failed");
            state.error = Some(format!("Failed to call Langflow API: {}", e));
            state.agent_response = Some(UPSTREAM_FAILURE_RESPONSE.to_string());
        }
    }
    Ok(state)
}

/// Populate leave fields from the agent reply.
///
/// Structured replies are trusted as-is. For free-text replies the user's
/// own message is scanned first; the reply text only contributes fields the
/// message left open, and never a day count or employee id since replies
/// routinely quote balances and other records.
pub async fn extract_data(mut state: LeaveState) -> Result<LeaveState> {
    match state.agent_reply.take() {
        Some(reply) if reply.structured => {
            state.query_flag = reply.query_flag;
            state.fill_missing(reply.data);
        }
        reply => {
            let mut data = scan_text(&state.message);
            if let Some(reply) = reply {
                let mut from_reply = reply.data;
                from_reply.days_requested = None;
                from_reply.employee_id = None;
                data.merge_missing(from_reply);
            }
            state.fill_missing(data);
        }
    }

    if state.days_requested.is_none() {
        state.days_requested = state.date_span_days();
    }

    tracing::debug!(
        days_requested = ?state.days_requested,
        leave_type = ?state.leave_type,
        query_flag = state.query_flag,
        "Leave data extracted"
    );

    state.advance(WorkflowStage::DataExtracted)?;
    Ok(state)
}

/// Compare the day count against the approval threshold.
pub async fn check_threshold(mut state: LeaveState, policy: ApprovalPolicy) -> Result<LeaveState> {
    let assessment = policy.assess(&state);
    state.requires_approval = assessment.requires_approval;
    state.approval_status = assessment.status;

    if assessment.requires_approval {
        tracing::info!(
            days_requested = ?state.days_requested,
            threshold = policy.threshold_days,
            "Request requires human approval"
        );
        state.advance(WorkflowStage::AwaitingHuman)?;
    } else {
        state.advance(WorkflowStage::AutoApproved)?;
    }
    Ok(state)
}

/// Apply the reviewer's decision recorded on the state.
pub async fn human_approval(mut state: LeaveState) -> Result<LeaveState> {
    let decision = state.approval_decision.clone().ok_or_else(|| {
        GraphError::state_error(None::<String>, "no approval decision recorded")
    })?;

    let (status, verb) = if decision.approved {
        (ApprovalStatus::Approved, "approved")
    } else {
        (ApprovalStatus::Rejected, "rejected")
    };

    let days = state
        .days_requested
        .map(|d| d.to_string())
        .unwrap_or_else(|| "the requested".to_string());

    state.agent_response = Some(format!(
        "Your leave request for {} days has been {}. Reason: {}",
        days, verb, decision.reason
    ));
    state.approval_status = Some(status);
    state.approval_reason = Some(decision.reason);

    tracing::info!(session_id = %state.session_id, status = %status, "Approval decision applied");
    Ok(state)
}

/// Compose the final response.
pub async fn finalize(mut state: LeaveState) -> Result<LeaveState> {
    if state.approval_status == Some(ApprovalStatus::AutoApproved)
        && state.days_requested.is_some_and(|days| days > 0)
    {
        let response = state.agent_response.take().unwrap_or_default();
        state.agent_response = Some(
            format!("{} {}", response, AUTO_APPROVED_SUFFIX)
                .trim_start()
                .to_string(),
        );
    }

    if let Some(error) = &state.error {
        state.agent_response = Some(format!(
            "Error: {}. Please try again or contact support.",
            error
        ));
    }

    state.advance(WorkflowStage::Finalized)?;
    Ok(state)
}

pub fn route_privacy(state: &LeaveState) -> String {
    if state.stage == WorkflowStage::Denied {
        "denied".to_string()
    } else {
        "allowed".to_string()
    }
}

pub fn route_agent(state: &LeaveState) -> String {
    if state.error.is_some() {
        "failed".to_string()
    } else {
        "ok".to_string()
    }
}

pub fn route_threshold(state: &LeaveState) -> String {
    if state.requires_approval {
        "approval".to_string()
    } else {
        "auto".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::ApprovalDecision;
    use crate::state::{LeaveRequest, LeaveType};
    use async_trait::async_trait;
    use langflow_client::{AgentReply, LangflowError};

    struct FixedBackend(std::result::Result<String, u16>);

    #[async_trait]
    impl AgentBackend for FixedBackend {
        async fn query(&self, _message: &str, _session_id: &str) -> langflow_client::Result<AgentReply> {
            match &self.0 {
                Ok(text) => Ok(AgentReply::from_text(text.clone())),
                Err(status) => Err(LangflowError::Status {
                    status: *status,
                    body: "boom".into(),
                }),
            }
        }
    }

    fn received(message: &str) -> LeaveState {
        LeaveState::new(LeaveRequest::new(message, "s-1").with_employee_id("EMP12345"))
    }

    fn upstream(message: &str) -> LeaveState {
        let mut state = received(message);
        state.advance(WorkflowStage::CallingUpstream).unwrap();
        state
    }

    #[tokio::test]
    async fn test_privacy_check_denies_foreign_id() {
        let state = privacy_check(received("What is EMP99999's balance?")).await.unwrap();
        assert_eq!(state.stage, WorkflowStage::Denied);
        assert_eq!(route_privacy(&state), "denied");

        let state = finalize_denied(state).await.unwrap();
        assert_eq!(state.agent_response, state.denial_reason);
    }

    #[tokio::test]
    async fn test_call_agent_failure_is_recorded() {
        let backend: Arc<dyn AgentBackend> = Arc::new(FixedBackend(Err(502)));
        let state = call_agent(upstream("hi"), backend).await.unwrap();

        assert_eq!(route_agent(&state), "failed");
        assert_eq!(state.agent_response.as_deref(), Some(UPSTREAM_FAILURE_RESPONSE));
        assert!(state.error.as_deref().unwrap().contains("502"));
    }

    #[tokio::test]
    async fn test_extract_fallback_prefers_user_message() {
        let backend: Arc<dyn AgentBackend> = Arc::new(FixedBackend(Ok(
            "Noted! You have 15 days of vacation remaining.".into(),
        )));
        let state = call_agent(upstream("I need 3 days off for vacation"), backend)
            .await
            .unwrap();
        let state = extract_data(state).await.unwrap();

        assert_eq!(state.days_requested, Some(3));
        assert_eq!(state.leave_type, Some(LeaveType::Vacation));
        assert_eq!(state.stage, WorkflowStage::DataExtracted);
        assert!(state.agent_reply.is_none());
    }

    #[tokio::test]
    async fn test_extract_derives_days_from_dates() {
        let structured = r#"{"conversational_response": "Got it", "query_flag": false,
            "data": {"start_date": "2024-12-23", "end_date": "2024-12-27", "leave_type": "vacation"}}"#;
        let backend: Arc<dyn AgentBackend> = Arc::new(FixedBackend(Ok(structured.into())));
        let state = call_agent(upstream("Christmas week off please"), backend).await.unwrap();
        let state = extract_data(state).await.unwrap();

        assert_eq!(state.days_requested, Some(5));
        assert_eq!(state.agent_response.as_deref(), Some("Got it"));
    }

    #[tokio::test]
    async fn test_human_approval_requires_decision() {
        let mut state = upstream("10 days");
        state.days_requested = Some(10);
        let err = human_approval(state.clone()).await.unwrap_err();
        assert!(matches!(err, GraphError::StateError { .. }));

        state.approval_decision = Some(ApprovalDecision::reject("Peak season"));
        let state = human_approval(state).await.unwrap();
        assert_eq!(state.approval_status, Some(ApprovalStatus::Rejected));
        assert_eq!(
            state.agent_response.as_deref(),
            Some("Your leave request for 10 days has been rejected. Reason: Peak season")
        );
    }

    #[tokio::test]
    async fn test_finalize_error_overrides_response() {
        let mut state = upstream("hi");
        state.error = Some("timeout".into());
        state.agent_response = Some(UPSTREAM_FAILURE_RESPONSE.into());

        let state = finalize(state).await.unwrap();
        assert_eq!(
            state.agent_response.as_deref(),
            Some("Error: timeout. Please try again or contact support.")
        );
        assert_eq!(state.stage, WorkflowStage::Finalized);
    }

    #[tokio::test]
    async fn test_finalize_suffix_only_for_nonzero_days() {
        for (days, expected) in [
            (0, "Noted."),
            (3, "Noted. Your request has been automatically approved."),
        ] {
            let mut state = upstream("time off");
            state.advance(WorkflowStage::DataExtracted).unwrap();
            state.days_requested = Some(days);
            state.agent_response = Some("Noted.".into());

            let state = check_threshold(state, ApprovalPolicy::default()).await.unwrap();
            assert_eq!(state.approval_status, Some(ApprovalStatus::AutoApproved));

            let state = finalize(state).await.unwrap();
            assert_eq!(state.agent_response.as_deref(), Some(expected));
        }
    }

    #[tokio::test]
    async fn test_finalize_rejects_out_of_order_stage() {
        let err = finalize(received("hi")).await.unwrap_err();
        assert!(matches!(err, GraphError::StateError { .. }));
    }
}
