//! Terminal rendering

use hr_agent::approval::format_days;
use hr_agent::{LeaveRequest, LeaveState};
use std::io::{self, Write};

pub const RULE: &str = "============================================================";
pub const SEPARATOR: &str = "------------------------------------------------------------";

/// How a finished run is printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Print the full state as JSON instead of the response block
    pub json: bool,
    /// Append the extracted leave fields
    pub debug: bool,
}

impl RenderOptions {
    /// Debug output follows the `DEBUG=true` environment switch
    pub fn from_env(json: bool) -> Self {
        let debug = std::env::var("DEBUG")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);
        Self { json, debug }
    }
}

pub fn banner<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out, "\n{}", RULE)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", RULE)
}

/// Echo the incoming request
pub fn processing<W: Write>(out: &mut W, request: &LeaveRequest) -> io::Result<()> {
    banner(out, "HR AGENT PROCESSING")?;
    writeln!(out, "User: {}", request.message)?;
    if let Some(employee_id) = &request.employee_id {
        writeln!(out, "Employee ID: {}", employee_id)?;
    }
    writeln!(out, "{}", RULE)
}

/// Print the outcome of a run
pub fn finished<W: Write>(out: &mut W, state: &LeaveState, options: RenderOptions) -> io::Result<()> {
    if options.json {
        let json = serde_json::to_string_pretty(state).map_err(io::Error::other)?;
        writeln!(out, "{}", json)?;
        return Ok(());
    }

    banner(out, "AGENT RESPONSE")?;
    writeln!(out, "{}", state.agent_response.as_deref().unwrap_or("No response"))?;
    writeln!(out, "{}", RULE)?;

    if options.debug {
        write!(out, "{}", debug_summary(state))?;
    }
    Ok(())
}

/// Extracted fields of a finished run, one `[DEBUG]` line each
pub fn debug_summary(state: &LeaveState) -> String {
    fn or_none<T: ToString>(value: Option<T>) -> String {
        value.map(|v| v.to_string()).unwrap_or_else(|| "None".to_string())
    }

    let mut summary = String::new();
    summary.push_str(&format!("\n[DEBUG] Employee ID: {}\n", or_none(state.employee_id.as_deref())));
    summary.push_str(&format!(
        "[DEBUG] Leave Balance: {}\n",
        or_none(state.leave_balance.map(format_days))
    ));
    summary.push_str(&format!("[DEBUG] Days Requested: {}\n", or_none(state.days_requested)));
    summary.push_str(&format!("[DEBUG] Leave Type: {}\n", or_none(state.leave_type.as_ref())));
    summary.push_str(&format!("[DEBUG] Approval Status: {}\n", or_none(state.approval_status)));
    summary.push_str(&format!("[DEBUG] Stage: {}\n", state.stage));
    if let Some(error) = &state.error {
        summary.push_str(&format!("[DEBUG] Error: {}\n", error));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use hr_agent::{ApprovalStatus, LeaveType};

    fn finished_state() -> LeaveState {
        let mut state = LeaveState::new(
            LeaveRequest::new("I need 3 days off", "s-1").with_employee_id("EMP12345"),
        );
        state.days_requested = Some(3);
        state.leave_type = Some(LeaveType::Vacation);
        state.leave_balance = Some(12.5);
        state.approval_status = Some(ApprovalStatus::AutoApproved);
        state.agent_response = Some("Enjoy your break!".into());
        state
    }

    #[test]
    fn test_response_block() {
        let mut out = Vec::new();
        finished(&mut out, &finished_state(), RenderOptions::default()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("AGENT RESPONSE"));
        assert!(text.contains("Enjoy your break!"));
        assert!(!text.contains("[DEBUG]"));
    }

    #[test]
    fn test_debug_summary() {
        let summary = debug_summary(&finished_state());
        assert!(summary.contains("[DEBUG] Employee ID: EMP12345"));
        assert!(summary.contains("[DEBUG] Leave Balance: 12.5"));
        assert!(summary.contains("[DEBUG] Leave Type: vacation"));
        assert!(summary.contains("[DEBUG] Approval Status: auto_approved"));
        assert!(!summary.contains("Error"));
    }

    #[test]
    fn test_json_output_is_state() {
        let mut out = Vec::new();
        let options = RenderOptions { json: true, debug: true };
        finished(&mut out, &finished_state(), options).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["days_requested"], 3);
        assert_eq!(value["approval_status"], "auto_approved");
        assert_eq!(value["stage"], "RECEIVED");
    }
}
