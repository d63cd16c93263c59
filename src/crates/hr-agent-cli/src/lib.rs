//! Command line front end for the HR leave assistant

pub mod args;
pub mod commands;
pub mod logging;
pub mod output;

pub use args::{Cli, Commands};
pub use logging::{init_tracing, LogFormat};
pub use output::RenderOptions;
