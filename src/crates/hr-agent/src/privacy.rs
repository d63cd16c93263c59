//! Privacy guardrail
//!
//! Employees may only ask about their own leave. A message that mentions any
//! other employee id is denied before it reaches the upstream agent.

use regex::Regex;
use std::sync::LazyLock;

static EMPLOYEE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bEMP\d+\b").unwrap());

/// Result of the privacy check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivacyVerdict {
    Allowed,
    Denied {
        /// Foreign employee ids found in the message, upper-cased
        referenced: Vec<String>,
        /// Explanation shown to the user
        reason: String,
    },
}

impl PrivacyVerdict {
    pub fn is_denied(&self) -> bool {
        matches!(self, PrivacyVerdict::Denied { .. })
    }
}

/// Employee ids (`EMP<digits>`, any case) mentioned in a message, upper-cased
/// and de-duplicated in order of appearance.
pub fn referenced_employee_ids(message: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for m in EMPLOYEE_ID_REGEX.find_iter(message) {
        let id = m.as_str().to_uppercase();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Check a message against the requester's own employee id.
///
/// Without a requester id every referenced id counts as foreign.
pub fn check_privacy(message: &str, requester: Option<&str>) -> PrivacyVerdict {
    let requester = requester.map(|id| id.trim().to_uppercase());

    let referenced: Vec<String> = referenced_employee_ids(message)
        .into_iter()
        .filter(|id| requester.as_deref() != Some(id.as_str()))
        .collect();

    if referenced.is_empty() {
        return PrivacyVerdict::Allowed;
    }

    let reason = format!(
        "I can only help with your own leave information. Requests about other employees ({}) cannot be processed.",
        referenced.join(", ")
    );
    PrivacyVerdict::Denied { referenced, reason }
}
