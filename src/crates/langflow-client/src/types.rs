//! Wire and reply types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of a run request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    pub output_type: String,
    pub input_type: String,
    pub input_value: String,
    pub session_id: String,
}

/// Leave fields the agent may report.
///
/// Agents are inconsistent about types, so numbers may arrive as JSON numbers
/// or numeric strings, and ids may arrive as numbers. Values that cannot be
/// interpreted are treated as absent rather than failing the whole reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaveData {
    #[serde(default, deserialize_with = "lenient_string")]
    pub employee_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub employee_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub leave_balance: Option<f64>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub leave_type: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub start_date: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub end_date: Option<String>,

    #[serde(default, deserialize_with = "lenient_u32")]
    pub days_requested: Option<u32>,
}

impl LeaveData {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == LeaveData::default()
    }

    /// Fill fields that are still empty from `other`.
    pub fn merge_missing(&mut self, other: LeaveData) {
        fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
            if slot.is_none() {
                *slot = value;
            }
        }

        fill(&mut self.employee_id, other.employee_id);
        fill(&mut self.employee_name, other.employee_name);
        fill(&mut self.leave_balance, other.leave_balance);
        fill(&mut self.leave_type, other.leave_type);
        fill(&mut self.start_date, other.start_date);
        fill(&mut self.end_date, other.end_date);
        fill(&mut self.days_requested, other.days_requested);
    }
}

/// JSON document an agent can embed in its message text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredReply {
    pub conversational_response: String,

    #[serde(default)]
    pub query_flag: bool,

    #[serde(default)]
    pub data: LeaveData,
}

/// Interpreted agent reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReply {
    /// Raw message text as returned by the endpoint
    pub text: String,

    /// Text to show the user
    pub response: String,

    /// Whether `text` parsed as a [`StructuredReply`]
    pub structured: bool,

    /// Agent marked the message as an informational query
    pub query_flag: bool,

    /// Extracted leave fields
    pub data: LeaveData,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }))
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    Ok(number
        .filter(|n| n.is_finite() && *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64)
        .map(|n| n as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_leave_data_accepts_numeric_strings() {
        let data: LeaveData = serde_json::from_value(json!({
            "employee_id": "EMP12345",
            "leave_balance": "12.5",
            "days_requested": "3",
        }))
        .unwrap();

        assert_eq!(data.employee_id.as_deref(), Some("EMP12345"));
        assert_eq!(data.leave_balance, Some(12.5));
        assert_eq!(data.days_requested, Some(3));
    }

    #[test]
    fn test_leave_data_ignores_uninterpretable_values() {
        let data: LeaveData = serde_json::from_value(json!({
            "employee_id": 42,
            "employee_name": "",
            "leave_balance": "plenty",
            "days_requested": 2.5,
            "start_date": null,
            "leave_type": ["vacation"],
        }))
        .unwrap();

        assert_eq!(data.employee_id.as_deref(), Some("42"));
        assert_eq!(data.employee_name, None);
        assert_eq!(data.leave_balance, None);
        assert_eq!(data.days_requested, None);
        assert_eq!(data.start_date, None);
        assert_eq!(data.leave_type, None);
    }

    #[test]
    fn test_merge_missing_keeps_existing_values() {
        let mut data = LeaveData {
            days_requested: Some(3),
            ..Default::default()
        };
        data.merge_missing(LeaveData {
            days_requested: Some(9),
            leave_type: Some("sick".into()),
            ..Default::default()
        });

        assert_eq!(data.days_requested, Some(3));
        assert_eq!(data.leave_type.as_deref(), Some("sick"));
        assert!(!data.is_empty());
        assert!(LeaveData::default().is_empty());
    }

    #[test]
    fn test_run_request_wire_shape() {
        let request = RunRequest {
            output_type: "chat".into(),
            input_type: "chat".into(),
            input_value: "How many days do I have?".into(),
            session_id: "s-1".into(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "output_type": "chat",
                "input_type": "chat",
                "input_value": "How many days do I have?",
                "session_id": "s-1",
            })
        );
    }
}
