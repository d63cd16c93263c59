//! hr-agent - HR leave assistant
//!
//! Main entry point for the hr-agent command-line tool.

use clap::Parser;
use hr_agent::{
    load_config, ConsoleApprovalHandler, LeaveRequest, LeaveWorkflow, SharedInput, SharedOutput,
};
use hr_agent_cli::{commands, init_tracing, Cli, Commands, RenderOptions};
use std::io::BufReader;
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).await?;
    init_tracing(&config.logging, cli.verbose)?;
    tracing::debug!(config = ?config, "Configuration loaded");

    // One stdin reader for chat turns and approval answers alike
    let stdin: SharedInput = Arc::new(Mutex::new(BufReader::new(std::io::stdin())));
    let prompts: SharedOutput = Arc::new(Mutex::new(std::io::stdout()));
    let approver = Arc::new(ConsoleApprovalHandler::new(Arc::clone(&stdin), prompts));
    let mut stdout = std::io::stdout();

    match cli.command {
        Commands::Graph => {
            println!("{}", commands::graph(&config)?);
            Ok(())
        }
        Commands::Config => {
            print!("{}", config.to_redacted_toml());
            Ok(())
        }
        Commands::Ask {
            message,
            employee_id,
            employee_name,
            session_id,
            json,
        } => {
            let workflow = LeaveWorkflow::from_config(&config, approver)?;
            let mut request = LeaveRequest::new(message, session_id.unwrap_or_default());
            request.employee_id = employee_id;
            request.employee_name = employee_name;
            commands::ask(&workflow, request, RenderOptions::from_env(json), &mut stdout).await
        }
        Commands::Interactive { employee_id } => {
            let workflow = LeaveWorkflow::from_config(&config, approver)?;
            commands::interactive(
                &workflow,
                employee_id,
                RenderOptions::from_env(false),
                &stdin,
                &mut stdout,
            )
            .await
        }
        Commands::Demo { no_pause } => {
            let workflow = LeaveWorkflow::from_config(&config, approver)?;
            commands::demo(
                &workflow,
                !no_pause,
                RenderOptions::from_env(false),
                &stdin,
                &mut stdout,
            )
            .await
        }
    }
}
