//! Leave request state
//!
//! [`LeaveState`] is threaded through every node of the workflow. Fields are
//! filled in as the request moves along and are never overwritten once set;
//! [`WorkflowStage`] records where the request is and only moves forward.
//!
//! ```text
//! Received ─┬─► Denied                                    (terminal)
//!           └─► CallingUpstream ─┬─► Finalized            (upstream failed)
//!                                └─► DataExtracted ─┬─► AutoApproved  ─► Finalized
//!                                                   └─► AwaitingHuman ─► Finalized
//! ```

use crate::approval::ApprovalDecision;
use chrono::NaiveDate;
use hr_graph::GraphError;
use langflow_client::{AgentReply, LeaveData};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a request is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStage {
    Received,
    Denied,
    CallingUpstream,
    DataExtracted,
    AutoApproved,
    AwaitingHuman,
    Finalized,
}

impl WorkflowStage {
    /// Whether the stage machine allows moving from `self` to `to`
    pub fn can_advance(self, to: WorkflowStage) -> bool {
        use WorkflowStage::*;
        matches!(
            (self, to),
            (Received, Denied)
                | (Received, CallingUpstream)
                | (CallingUpstream, DataExtracted)
                | (CallingUpstream, Finalized)
                | (DataExtracted, AutoApproved)
                | (DataExtracted, AwaitingHuman)
                | (AutoApproved, Finalized)
                | (AwaitingHuman, Finalized)
        )
    }

    /// No further transitions are possible
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkflowStage::Denied | WorkflowStage::Finalized)
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowStage::Received => "RECEIVED",
            WorkflowStage::Denied => "DENIED",
            WorkflowStage::CallingUpstream => "CALLING_UPSTREAM",
            WorkflowStage::DataExtracted => "DATA_EXTRACTED",
            WorkflowStage::AutoApproved => "AUTO_APPROVED",
            WorkflowStage::AwaitingHuman => "AWAITING_HUMAN",
            WorkflowStage::Finalized => "FINALIZED",
        };
        f.write_str(name)
    }
}

/// Approval outcome of a leave request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    AutoApproved,
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApprovalStatus::AutoApproved => "auto_approved",
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Kind of leave
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LeaveType {
    Vacation,
    Sick,
    Personal,
    Other(String),
}

impl From<&str> for LeaveType {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "vacation" => LeaveType::Vacation,
            "sick" => LeaveType::Sick,
            "personal" => LeaveType::Personal,
            _ => LeaveType::Other(value.trim().to_string()),
        }
    }
}

impl From<String> for LeaveType {
    fn from(value: String) -> Self {
        LeaveType::from(value.as_str())
    }
}

impl From<LeaveType> for String {
    fn from(value: LeaveType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaveType::Vacation => f.write_str("vacation"),
            LeaveType::Sick => f.write_str("sick"),
            LeaveType::Personal => f.write_str("personal"),
            LeaveType::Other(other) => f.write_str(other),
        }
    }
}

/// A user message entering the workflow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub message: String,
    pub session_id: String,
    pub employee_id: Option<String>,
    pub employee_name: Option<String>,
}

impl LeaveRequest {
    pub fn new(message: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: session_id.into(),
            ..Default::default()
        }
    }

    /// Identify the logged-in employee making the request
    pub fn with_employee_id(mut self, employee_id: impl Into<String>) -> Self {
        self.employee_id = Some(employee_id.into());
        self
    }

    pub fn with_employee_name(mut self, employee_name: impl Into<String>) -> Self {
        self.employee_name = Some(employee_name.into());
        self
    }
}

/// State carried through the leave workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveState {
    pub message: String,
    pub session_id: String,

    pub employee_id: Option<String>,
    pub employee_name: Option<String>,
    pub leave_type: Option<LeaveType>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub days_requested: Option<u32>,
    pub leave_balance: Option<f64>,

    /// The message is an informational query, not a leave request
    pub query_flag: bool,
    pub requires_approval: bool,
    pub approval_status: Option<ApprovalStatus>,
    pub approval_reason: Option<String>,

    /// Decision supplied by a reviewer while the run is paused
    pub approval_decision: Option<ApprovalDecision>,

    pub agent_response: Option<String>,
    pub error: Option<String>,
    pub denial_reason: Option<String>,
    pub stage: WorkflowStage,

    /// Raw upstream reply, kept until the data extraction step runs
    #[serde(skip)]
    pub(crate) agent_reply: Option<AgentReply>,
}

impl LeaveState {
    /// Fresh state for an incoming request
    pub fn new(request: LeaveRequest) -> Self {
        Self {
            message: request.message,
            session_id: request.session_id,
            employee_id: request.employee_id,
            employee_name: request.employee_name,
            leave_type: None,
            start_date: None,
            end_date: None,
            days_requested: None,
            leave_balance: None,
            query_flag: false,
            requires_approval: false,
            approval_status: None,
            approval_reason: None,
            approval_decision: None,
            agent_response: None,
            error: None,
            denial_reason: None,
            stage: WorkflowStage::Received,
            agent_reply: None,
        }
    }

    /// Move to the next stage, rejecting transitions the stage machine forbids
    pub fn advance(&mut self, to: WorkflowStage) -> hr_graph::Result<()> {
        if !self.stage.can_advance(to) {
            return Err(GraphError::state_error(
                None::<String>,
                format!("illegal stage transition {} -> {}", self.stage, to),
            ));
        }
        tracing::debug!(from = %self.stage, to = %to, "Stage transition");
        self.stage = to;
        Ok(())
    }

    /// Copy extracted leave fields into empty slots
    pub fn fill_missing(&mut self, data: LeaveData) {
        set_once(&mut self.employee_id, data.employee_id);
        set_once(&mut self.employee_name, data.employee_name);
        set_once(&mut self.leave_type, data.leave_type.map(LeaveType::from));
        set_once(&mut self.start_date, data.start_date);
        set_once(&mut self.end_date, data.end_date);
        set_once(&mut self.days_requested, data.days_requested);
        set_once(&mut self.leave_balance, data.leave_balance);
    }

    /// Inclusive day span between the start and end dates
    ///
    /// `None` unless both dates are `YYYY-MM-DD` and the end is not before the
    /// start.
    pub fn date_span_days(&self) -> Option<u32> {
        let start = NaiveDate::parse_from_str(self.start_date.as_deref()?, "%Y-%m-%d").ok()?;
        let end = NaiveDate::parse_from_str(self.end_date.as_deref()?, "%Y-%m-%d").ok()?;
        let days = (end - start).num_days();
        (days >= 0).then(|| days as u32 + 1)
    }
}

fn set_once<T>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        *slot = value;
    }
}
