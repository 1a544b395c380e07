//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod commands;
mod config;
mod logging;

pub use commands::{GenerateArgs, InputArgs, handle_generate, handle_validate};
pub use config::{ConfigSubcommand, handle_config_command};
pub use logging::init_logging;
