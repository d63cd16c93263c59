//! Command line arguments

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "hr-agent")]
#[command(about = "HR leave assistant with privacy guardrails and human approval", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file layered over the user and project files
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Commands {
    /// Send a single message to the assistant
    Ask {
        /// What to ask, e.g. "I need 3 days off next week"
        message: String,

        /// Your employee id (e.g. EMP12345)
        #[arg(long)]
        employee_id: Option<String>,

        /// Your name
        #[arg(long)]
        employee_name: Option<String>,

        /// Continue an existing conversation
        #[arg(long)]
        session_id: Option<String>,

        /// Print the final state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Chat with the assistant in a single session
    Interactive {
        /// Your employee id; asked for when omitted
        #[arg(long)]
        employee_id: Option<String>,
    },

    /// Run the predefined demo scenarios
    Demo {
        /// Don't wait for Enter between scenarios
        #[arg(long)]
        no_pause: bool,
    },

    /// Print the workflow as a Mermaid diagram
    Graph,

    /// Print the effective configuration (API key redacted)
    Config,
}
