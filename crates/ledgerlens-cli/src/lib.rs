//! LedgerLens CLI library.
//!
//! Configuration, command execution, the chat REPL and output formatting
//! for the `ledgerlens` binary.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod provider;
pub mod repl;

pub use app::App;
pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
