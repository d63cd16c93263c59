//! Client for a Langflow-hosted HR agent.
//!
//! Sends a user message to a flow's run endpoint and interprets the reply.
//! Replies are either a JSON [`StructuredReply`] embedded in the message text
//! or free text, from which leave fields are recovered with [`scan_text`].

pub mod client;
pub mod config;
pub mod error;
pub mod parse;
pub mod retry;
pub mod types;

pub use client::{new_session_id, AgentBackend, LangflowClient};
pub use config::{LangflowConfig, API_KEY_ENV, API_URL_ENV};
pub use error::{LangflowError, Result};
pub use parse::{extract_message_text, parse_structured, scan_text, MESSAGE_TEXT_POINTER};
pub use retry::RetryPolicy;
pub use types::{AgentReply, LeaveData, RunRequest, StructuredReply};
