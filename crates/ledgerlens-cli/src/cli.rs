//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// LedgerLens - Turn 10-K filings into knowledge graphs and ask about them.
#[derive(Debug, Parser)]
#[command(name = "ledgerlens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "LEDGERLENS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (file names only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload a 10-K PDF
    Upload(UploadArgs),

    /// List uploaded documents and their graph status
    List,

    /// Extract the knowledge graph of an uploaded document
    Process(ProcessArgs),

    /// Show where a document's graph can be viewed
    View(ViewArgs),

    /// Ask one question about a processed document
    Ask(AskArgs),

    /// Chat about a processed document
    Chat(ChatArgs),

    /// Delete a document and its derived artifacts
    Delete(DeleteArgs),

    /// Run the graph server
    Serve(ServeArgs),
}

/// Arguments for the upload command.
#[derive(Debug, Parser)]
pub struct UploadArgs {
    /// Path of the PDF to upload
    pub path: PathBuf,

    /// Process the document right after uploading
    #[arg(short, long)]
    pub process: bool,
}

/// Arguments for the process command.
#[derive(Debug, Parser)]
pub struct ProcessArgs {
    /// Uploaded file name (e.g., ACME-2024.pdf)
    pub file: Option<String>,
}

/// Arguments for the view command.
#[derive(Debug, Parser)]
pub struct ViewArgs {
    /// Uploaded file name
    pub file: Option<String>,

    /// Print the embeddable HTML snippet instead of the URL
    #[arg(long)]
    pub html: bool,
}

/// Arguments for the ask command.
#[derive(Debug, Parser)]
pub struct AskArgs {
    /// Uploaded file name
    pub file: String,

    /// The question
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,
}

/// Arguments for the chat command.
#[derive(Debug, Parser)]
pub struct ChatArgs {
    /// Uploaded file name to chat about
    pub file: Option<String>,
}

/// Arguments for the delete command.
#[derive(Debug, Parser)]
pub struct DeleteArgs {
    /// Uploaded file name
    pub file: Option<String>,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the serve command.
#[derive(Debug, Parser)]
pub struct ServeArgs {
    /// Bind address (overrides the config file)
    #[arg(long)]
    pub bind_address: Option<String>,

    /// Bind port (overrides the config file)
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::parse_from(["ledgerlens"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_ask_joins_question_words() {
        let cli = Cli::parse_from(["ledgerlens", "ask", "ACME.pdf", "What", "are", "the", "risks?"]);
        match cli.command {
            Some(Command::Ask(args)) => {
                assert_eq!(args.file, "ACME.pdf");
                assert_eq!(args.question.join(" "), "What are the risks?");
            }
            _ => panic!("Expected Ask command"),
        }
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::parse_from(["ledgerlens", "serve", "--port", "9000"]);
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(9000));
                assert!(args.bind_address.is_none());
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_global_format_after_subcommand() {
        let cli = Cli::parse_from(["ledgerlens", "list", "--format", "json"]);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert!(matches!(cli.command, Some(Command::List)));
    }
}
