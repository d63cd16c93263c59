//! Human approval
//!
//! Requests above the approval threshold pause the workflow before the
//! `human_approval` node. An [`ApprovalHandler`] is asked for a decision, which
//! is written into the state before the run resumes.

use crate::error::{HrAgentError, Result};
use crate::state::{LeaveState, LeaveType};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::io::{BufRead, BufReader, Write};
use std::sync::{Arc, Mutex};

/// Reason recorded when the reviewer gives none
pub const NO_REASON: &str = "No reason provided";

const RULE: &str = "============================================================";

/// Summary of a pending request shown to the reviewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub session_id: String,
    pub employee_id: Option<String>,
    pub employee_name: Option<String>,
    pub leave_type: Option<LeaveType>,
    pub days_requested: Option<u32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub leave_balance: Option<f64>,
    pub message: String,
}

impl ApprovalRequest {
    pub fn from_state(state: &LeaveState) -> Self {
        Self {
            session_id: state.session_id.clone(),
            employee_id: state.employee_id.clone(),
            employee_name: state.employee_name.clone(),
            leave_type: state.leave_type.clone(),
            days_requested: state.days_requested,
            start_date: state.start_date.clone(),
            end_date: state.end_date.clone(),
            leave_balance: state.leave_balance,
            message: state.message.clone(),
        }
    }
}

impl fmt::Display for ApprovalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unknown = || "Unknown".to_string();
        writeln!(f, "{}", RULE)?;
        writeln!(f, "HUMAN APPROVAL REQUIRED")?;
        writeln!(f, "{}", RULE)?;
        writeln!(f, "Employee ID: {}", self.employee_id.clone().unwrap_or_else(unknown))?;
        writeln!(f, "Employee Name: {}", self.employee_name.clone().unwrap_or_else(unknown))?;
        writeln!(
            f,
            "Leave Type: {}",
            self.leave_type.as_ref().map(ToString::to_string).unwrap_or_else(unknown)
        )?;
        writeln!(f, "Duration: {} days", self.days_requested.unwrap_or(0))?;
        writeln!(
            f,
            "Dates: {} to {}",
            self.start_date.as_deref().unwrap_or("N/A"),
            self.end_date.as_deref().unwrap_or("N/A")
        )?;
        writeln!(
            f,
            "Current Balance: {} days",
            self.leave_balance.map(format_days).unwrap_or_else(unknown)
        )?;
        write!(f, "{}", RULE)
    }
}

/// Render a day count without a trailing `.0`
pub fn format_days(days: f64) -> String {
    if days.fract() == 0.0 {
        format!("{:.0}", days)
    } else {
        format!("{}", days)
    }
}

/// A reviewer's decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalDecision {
    pub approved: bool,
    pub reason: String,
}

impl ApprovalDecision {
    /// Blank reasons are replaced with [`NO_REASON`]
    pub fn new(approved: bool, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let reason = reason.trim();
        Self {
            approved,
            reason: if reason.is_empty() {
                NO_REASON.to_string()
            } else {
                reason.to_string()
            },
        }
    }

    pub fn approve(reason: impl Into<String>) -> Self {
        Self::new(true, reason)
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self::new(false, reason)
    }
}

/// Source of approval decisions
#[async_trait]
pub trait ApprovalHandler: Send + Sync {
    /// Decide on a pending request.
    async fn decide(&self, request: &ApprovalRequest) -> Result<ApprovalDecision>;
}

/// Line input shared by a chat loop and the approval prompt
pub type SharedInput = Arc<Mutex<dyn BufRead + Send>>;

/// Output the approval prompt writes to
pub type SharedOutput = Arc<Mutex<dyn Write + Send>>;

/// Prompts a reviewer on the terminal
///
/// The prompt reads from a [`SharedInput`]. A chat loop that also reads user
/// messages must read them from the same handle, otherwise a buffered reader
/// on one side swallows the answers meant for the other.
#[derive(Clone)]
pub struct ConsoleApprovalHandler {
    input: SharedInput,
    output: SharedOutput,
}

impl ConsoleApprovalHandler {
    pub fn new(input: SharedInput, output: SharedOutput) -> Self {
        Self { input, output }
    }

    /// Handler with its own stdin reader, for runs where nothing else reads stdin
    pub fn stdio() -> Self {
        Self::new(
            Arc::new(Mutex::new(BufReader::new(std::io::stdin()))),
            Arc::new(Mutex::new(std::io::stdout())),
        )
    }
}

impl fmt::Debug for ConsoleApprovalHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleApprovalHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl ApprovalHandler for ConsoleApprovalHandler {
    async fn decide(&self, request: &ApprovalRequest) -> Result<ApprovalDecision> {
        let request = request.clone();
        let input = Arc::clone(&self.input);
        let output = Arc::clone(&self.output);
        tokio::task::spawn_blocking(move || {
            let mut input = input
                .lock()
                .map_err(|_| HrAgentError::Approval("input lock poisoned".into()))?;
            let mut output = output
                .lock()
                .map_err(|_| HrAgentError::Approval("output lock poisoned".into()))?;
            prompt_decision(&request, &mut *input, &mut *output)
        })
        .await
        .map_err(|e| HrAgentError::Approval(format!("prompt task failed: {}", e)))?
    }
}

/// Show `request` and read a decision from `input`.
///
/// Asks until the answer is `yes` or `no` (any case), then reads an optional
/// reason. End of input before a decision is an error.
pub fn prompt_decision<R, W>(
    request: &ApprovalRequest,
    input: &mut R,
    output: &mut W,
) -> Result<ApprovalDecision>
where
    R: BufRead + ?Sized,
    W: Write + ?Sized,
{
    writeln!(output, "\n{}", request)?;

    let approved = loop {
        write!(output, "\nApprove this request? (yes/no): ")?;
        output.flush()?;

        let answer = read_line(input)?
            .ok_or_else(|| HrAgentError::Approval("input closed before a decision".into()))?;
        match answer.to_lowercase().as_str() {
            "yes" => break true,
            "no" => break false,
            _ => writeln!(output, "Please enter 'yes' or 'no'")?,
        }
    };

    write!(output, "Reason (optional): ")?;
    output.flush()?;
    let reason = read_line(input)?.unwrap_or_default();

    let decision = ApprovalDecision::new(approved, reason);
    writeln!(
        output,
        "\nDecision recorded: {}",
        if decision.approved { "approved" } else { "rejected" }
    )?;
    writeln!(output, "{}\n", RULE)?;

    Ok(decision)
}

fn read_line<R: BufRead + ?Sized>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Replays a fixed list of decisions, for tests and unattended runs
#[derive(Debug, Default)]
pub struct ScriptedApprovalHandler {
    decisions: Mutex<VecDeque<ApprovalDecision>>,
    seen: Mutex<Vec<ApprovalRequest>>,
}

impl ScriptedApprovalHandler {
    pub fn new(decisions: impl IntoIterator<Item = ApprovalDecision>) -> Self {
        Self {
            decisions: Mutex::new(decisions.into_iter().collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ApprovalRequest> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ApprovalHandler for ScriptedApprovalHandler {
    async fn decide(&self, request: &ApprovalRequest) -> Result<ApprovalDecision> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(request.clone());
        }

        self.decisions
            .lock()
            .map_err(|_| HrAgentError::Approval("decision queue poisoned".into()))?
            .pop_front()
            .ok_or_else(|| HrAgentError::Approval("no scripted decision left".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LeaveRequest;
    use std::io::Cursor;

    fn request() -> ApprovalRequest {
        let mut state = LeaveState::new(
            LeaveRequest::new("10 days in December", "s").with_employee_id("EMP12345"),
        );
        state.leave_type = Some(LeaveType::Vacation);
        state.days_requested = Some(10);
        state.leave_balance = Some(15.0);
        ApprovalRequest::from_state(&state)
    }

    #[test]
    fn test_blank_reason_replaced() {
        assert_eq!(ApprovalDecision::approve("   ").reason, NO_REASON);
        assert_eq!(ApprovalDecision::reject(" busy period ").reason, "busy period");
    }

    #[test]
    fn test_request_banner() {
        let banner = request().to_string();
        assert!(banner.contains("Employee ID: EMP12345"));
        assert!(banner.contains("Employee Name: Unknown"));
        assert!(banner.contains("Leave Type: vacation"));
        assert!(banner.contains("Duration: 10 days"));
        assert!(banner.contains("Dates: N/A to N/A"));
        assert!(banner.contains("Current Balance: 15 days"));
    }

    #[test]
    fn test_prompt_reasks_until_valid() {
        let mut input = Cursor::new("maybe\nYES\nTeam is covered\n");
        let mut output = Vec::new();

        let decision = prompt_decision(&request(), &mut input, &mut output).unwrap();
        assert_eq!(decision, ApprovalDecision::approve("Team is covered"));

        let transcript = String::from_utf8(output).unwrap();
        assert_eq!(transcript.matches("Approve this request?").count(), 2);
        assert!(transcript.contains("Please enter 'yes' or 'no'"));
        assert!(transcript.contains("Decision recorded: approved"));
    }

    #[test]
    fn test_prompt_empty_reason() {
        let mut input = Cursor::new("no\n\n");
        let decision = prompt_decision(&request(), &mut input, &mut Vec::new()).unwrap();
        assert_eq!(decision, ApprovalDecision::reject(NO_REASON));
    }

    #[test]
    fn test_prompt_eof_is_error() {
        let mut input = Cursor::new("perhaps\n");
        let err = prompt_decision(&request(), &mut input, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, HrAgentError::Approval(_)));
    }

    #[tokio::test]
    async fn test_scripted_handler_replays_in_order() {
        let handler = ScriptedApprovalHandler::new([
            ApprovalDecision::approve("ok"),
            ApprovalDecision::reject("no cover"),
        ]);

        assert!(handler.decide(&request()).await.unwrap().approved);
        assert!(!handler.decide(&request()).await.unwrap().approved);
        assert!(handler.decide(&request()).await.is_err());
        assert_eq!(handler.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_console_handler_leaves_rest_of_shared_input() {
        let input: SharedInput = Arc::new(Mutex::new(Cursor::new("yes\nCovered\nnext message\n")));
        let prompts = Arc::new(Mutex::new(Vec::<u8>::new()));
        let handler = ConsoleApprovalHandler::new(Arc::clone(&input), prompts.clone());

        let decision = handler.decide(&request()).await.unwrap();
        assert_eq!(decision, ApprovalDecision::approve("Covered"));

        let mut rest = String::new();
        input.lock().unwrap().read_line(&mut rest).unwrap();
        assert_eq!(rest, "next message\n");

        let transcript = String::from_utf8(prompts.lock().unwrap().clone()).unwrap();
        assert!(transcript.contains("HUMAN APPROVAL REQUIRED"));
        assert!(transcript.contains("Decision recorded: approved"));
    }
}
