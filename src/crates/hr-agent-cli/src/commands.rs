//! Command handlers
//!
//! Handlers take their input and output streams as parameters so the binary
//! can hand them stdin/stdout and tests can hand them buffers. Line input is a
//! [`SharedInput`] so a console approval prompt can read from the same handle
//! between turns.

use crate::output::{self, RenderOptions, RULE, SEPARATOR};
use anyhow::Result;
use hr_agent::{
    HrAgentConfig, LeaveRequest, LeaveState, LeaveWorkflow, SharedInput, DEMO_SCENARIOS,
    EXAMPLE_QUERIES,
};
use langflow_client::new_session_id;
use std::io::{BufRead, Write};

/// Run one message and print the outcome.
pub async fn ask<W: Write>(
    workflow: &LeaveWorkflow,
    request: LeaveRequest,
    options: RenderOptions,
    out: &mut W,
) -> Result<()> {
    if !options.json {
        output::processing(out, &request)?;
    }
    let state = workflow.run(request).await?;
    log_outcome(&state);
    output::finished(out, &state, options)?;
    Ok(())
}

/// Chat loop sharing one session id until `quit`, `exit` or end of input.
///
/// A failed turn is reported and the loop carries on.
pub async fn interactive<W: Write>(
    workflow: &LeaveWorkflow,
    employee_id: Option<String>,
    options: RenderOptions,
    input: &SharedInput,
    out: &mut W,
) -> Result<()> {
    output::banner(out, "HR AGENT - INTERACTIVE MODE")?;
    writeln!(out, "Type 'quit' or 'exit' to end the conversation")?;
    writeln!(out, "Type 'help' for example queries")?;
    writeln!(out, "{}", RULE)?;

    let employee_id = match employee_id {
        Some(id) => Some(id),
        None => {
            write!(out, "\nEnter your Employee ID (or press Enter to skip): ")?;
            out.flush()?;
            read_line(input)?.filter(|id| !id.is_empty())
        }
    };

    let session_id = new_session_id();
    tracing::info!(session_id = %session_id, "Interactive session started");

    loop {
        write!(out, "\nYou: ")?;
        out.flush()?;

        let Some(line) = read_line(input)? else {
            writeln!(out, "\nGoodbye!")?;
            break;
        };

        match line.to_lowercase().as_str() {
            "" => continue,
            "quit" | "exit" => {
                writeln!(out, "\nGoodbye!")?;
                break;
            }
            "help" => {
                writeln!(out, "\nExample queries:")?;
                for query in EXAMPLE_QUERIES {
                    writeln!(out, "  - {}", query)?;
                }
                continue;
            }
            _ => {}
        }

        let mut request = LeaveRequest::new(line, session_id.as_str());
        request.employee_id = employee_id.clone();

        match workflow.run(request).await {
            Ok(state) => {
                log_outcome(&state);
                output::finished(out, &state, options)?;
            }
            Err(e) => {
                tracing::error!(error = %e, "Turn failed");
                writeln!(out, "\nError: {}", e)?;
            }
        }
        writeln!(out, "{}", SEPARATOR)?;
    }

    Ok(())
}

/// Run the canned scenarios, optionally waiting for Enter between them.
pub async fn demo<W: Write>(
    workflow: &LeaveWorkflow,
    pause: bool,
    options: RenderOptions,
    input: &SharedInput,
    out: &mut W,
) -> Result<()> {
    output::banner(out, "HR AGENT - DEMO MODE")?;
    writeln!(out, "Running predefined scenarios to demonstrate capabilities")?;
    writeln!(out, "{}", RULE)?;

    for (index, scenario) in DEMO_SCENARIOS.iter().enumerate() {
        writeln!(out, "\n\n{}", scenario.name)?;

        let request = scenario.request(new_session_id());
        output::processing(out, &request)?;
        match workflow.run(request).await {
            Ok(state) => {
                log_outcome(&state);
                output::finished(out, &state, options)?;
            }
            Err(e) => {
                tracing::error!(scenario = scenario.name, error = %e, "Scenario failed");
                writeln!(out, "\nError: {}", e)?;
            }
        }

        if pause && index + 1 < DEMO_SCENARIOS.len() {
            write!(out, "\nPress Enter to continue to next scenario...")?;
            out.flush()?;
            if read_line(input)?.is_none() {
                break;
            }
        }
    }

    Ok(())
}

/// Mermaid diagram for the configured approval threshold
pub fn graph(config: &HrAgentConfig) -> Result<String> {
    Ok(hr_agent::diagram(config.approval.policy())?)
}

fn log_outcome(state: &LeaveState) {
    tracing::info!(
        session_id = %state.session_id,
        stage = %state.stage,
        days_requested = ?state.days_requested,
        leave_type = ?state.leave_type,
        approval_status = ?state.approval_status,
        error = ?state.error,
        "Run finished"
    );
}

// The lock is released before the caller awaits the workflow
fn read_line(input: &SharedInput) -> Result<Option<String>> {
    let mut reader = input
        .lock()
        .map_err(|_| anyhow::anyhow!("input lock poisoned"))?;
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
