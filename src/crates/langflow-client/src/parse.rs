//! Reply parsing
//!
//! The run endpoint wraps the agent's message in several layers of output
//! objects. The message text itself is either a JSON [`StructuredReply`] or
//! plain prose, in which case leave fields are recovered with regular
//! expressions.

use crate::error::{LangflowError, Result};
use crate::types::{AgentReply, LeaveData, StructuredReply};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// JSON pointer to the message text in a run response.
pub const MESSAGE_TEXT_POINTER: &str = "/outputs/0/outputs/0/results/message/text";

static DAYS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*days?").unwrap());

/// Leave type keywords, highest priority first.
const LEAVE_TYPES: [&str; 3] = ["vacation", "sick", "personal"];

static DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap());

static EMPLOYEE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bEMP\d+\b").unwrap());

/// Read the agent's message text out of a run response.
pub fn extract_message_text(body: &Value) -> Result<String> {
    body.pointer(MESSAGE_TEXT_POINTER)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            LangflowError::InvalidResponse(
                "missing outputs[0].outputs[0].results.message.text".to_string(),
            )
        })
}

/// Parse message text as a [`StructuredReply`].
///
/// A surrounding Markdown code fence (with or without a `json` tag) is
/// ignored. Returns `None` when the text is not a structured reply.
pub fn parse_structured(text: &str) -> Option<StructuredReply> {
    serde_json::from_str(strip_code_fence(text)).ok()
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Skip the info string ("json") on the opening line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Recover leave fields from free text.
///
/// - days: first `<n> day(s)`, case-insensitive
/// - leave type: vacation, then sick, then personal, whichever is mentioned first in that order
/// - dates: first two `YYYY-MM-DD` tokens, only when at least two are present
/// - employee id: first `EMP<digits>` token, upper-cased
pub fn scan_text(text: &str) -> LeaveData {
    let days_requested = DAYS_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok());

    let lowered = text.to_lowercase();
    let leave_type = LEAVE_TYPES
        .iter()
        .find(|kind| lowered.contains(*kind))
        .map(|kind| kind.to_string());

    let dates: Vec<&str> = DATE_REGEX.find_iter(text).take(2).map(|m| m.as_str()).collect();
    let (start_date, end_date) = match dates.as_slice() {
        [start, end] => (Some(start.to_string()), Some(end.to_string())),
        _ => (None, None),
    };

    let employee_id = EMPLOYEE_ID_REGEX
        .find(text)
        .map(|m| m.as_str().to_uppercase());

    LeaveData {
        employee_id,
        employee_name: None,
        leave_balance: None,
        leave_type,
        start_date,
        end_date,
        days_requested,
    }
}

impl AgentReply {
    /// Interpret message text, preferring the structured form.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();

        match parse_structured(&text) {
            Some(reply) => {
                tracing::debug!("Agent reply parsed as structured JSON");
                Self {
                    response: reply.conversational_response,
                    structured: true,
                    query_flag: reply.query_flag,
                    data: reply.data,
                    text,
                }
            }
            None => {
                tracing::debug!("Agent reply is plain text, scanning for leave fields");
                Self {
                    response: text.clone(),
                    structured: false,
                    query_flag: false,
                    data: scan_text(&text),
                    text,
                }
            }
        }
    }
}
