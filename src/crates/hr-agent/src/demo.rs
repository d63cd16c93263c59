//! Canned demo scenarios and example queries

use crate::state::LeaveRequest;

/// A scripted request used by the demo command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoScenario {
    pub name: &'static str,
    pub message: &'static str,
    pub employee_id: &'static str,
}

impl DemoScenario {
    /// Request for this scenario within `session_id`
    pub fn request(&self, session_id: impl Into<String>) -> LeaveRequest {
        LeaveRequest::new(self.message, session_id).with_employee_id(self.employee_id)
    }
}

pub const DEMO_SCENARIOS: [DemoScenario; 3] = [
    DemoScenario {
        name: "Scenario 1: Check Leave Balance",
        message: "What is my current leave balance?",
        employee_id: "EMP12345",
    },
    DemoScenario {
        name: "Scenario 2: Small Leave Request (Auto-Approve)",
        message: "I want to take 3 days off next week for vacation",
        employee_id: "EMP12345",
    },
    DemoScenario {
        name: "Scenario 3: Large Leave Request (Requires Approval)",
        message: "I need to take 10 days off in December for vacation",
        employee_id: "EMP12345",
    },
];

/// Shown by `help` in interactive mode
pub const EXAMPLE_QUERIES: [&str; 5] = [
    "What is my current leave balance?",
    "I want to take 3 days off next week for vacation",
    "Submit a vacation request for December 20-27",
    "What is the company's vacation policy?",
    "How many sick days do I have left?",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::privacy::check_privacy;
    use langflow_client::scan_text;

    #[test]
    fn test_scenarios_pass_privacy_check() {
        for scenario in DEMO_SCENARIOS {
            let request = scenario.request("demo");
            assert!(!check_privacy(&request.message, request.employee_id.as_deref()).is_denied());
        }
    }

    #[test]
    fn test_scenario_day_counts() {
        let days: Vec<Option<u32>> = DEMO_SCENARIOS
            .iter()
            .map(|s| scan_text(s.message).days_requested)
            .collect();
        assert_eq!(days, vec![None, Some(3), Some(10)]);
    }
}
