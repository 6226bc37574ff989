//! Interactive chat about a processed document.

use crate::app::App;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use ledgerlens_domain::DocumentId;
use ledgerlens_pipeline::ChatTurn;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

/// Run the chat REPL, optionally starting on `file`.
pub async fn run_chat(app: &App, file: Option<String>, formatter: &Formatter) -> Result<()> {
    println!(
        "{}",
        formatter.info("LedgerLens chat - Type 'help' for commands, 'exit' to quit")
    );
    println!();

    let editor_config = rustyline::Config::builder()
        .max_history_size(app.config().settings.history_size)
        .map_err(editor_error)?
        .build();
    let mut editor = DefaultEditor::with_config(editor_config).map_err(editor_error)?;

    let history_path = get_history_path()?;
    let _ = editor.load_history(&history_path);

    let mut file = file;
    let mut history: Vec<ChatTurn> = Vec::new();

    loop {
        let prompt = match &file {
            Some(f) => format!("{}> ", f),
            None => "ledgerlens (no document)> ".to_string(),
        };

        match editor.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                editor.add_history_entry(line).ok();

                match parse_line(line) {
                    ReplCommand::Exit => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    ReplCommand::Help => print_help(formatter),
                    ReplCommand::Use(name) => {
                        if DocumentId::from_filename(&name).is_some() {
                            println!("{}", formatter.info(&format!("Using {}", name)));
                            file = Some(name);
                            history.clear();
                        } else {
                            eprintln!(
                                "{}",
                                formatter.error(&format!("Invalid file name: {}", name))
                            );
                        }
                    }
                    ReplCommand::Docs => match app.documents().list_documents() {
                        Ok(documents) => match formatter.format_documents(&documents) {
                            Ok(listing) => println!("{}", listing),
                            Err(e) => eprintln!("{}", formatter.error(&e.to_string())),
                        },
                        Err(e) => eprintln!("{}", formatter.error(&e.to_string())),
                    },
                    ReplCommand::History => print_history(&history),
                    ReplCommand::Question(question) => {
                        if let Err(e) = ensure_ready(app, file.as_deref()) {
                            eprintln!("{}", formatter.error(&e.to_string()));
                            continue;
                        }
                        let answer = app
                            .query()
                            .chat_turn(file.as_deref(), &question, &mut history)
                            .await;
                        println!("{}", formatter.answer(&answer));
                    }
                    ReplCommand::Invalid(message) => {
                        eprintln!("{}", formatter.error(&message));
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use 'exit' to quit"));
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    editor.save_history(&history_path).ok();

    Ok(())
}

/// One parsed line of chat input.
#[derive(Debug, PartialEq)]
enum ReplCommand {
    Exit,
    Help,
    Use(String),
    Docs,
    History,
    Question(String),
    Invalid(String),
}

fn parse_line(line: &str) -> ReplCommand {
    match line {
        "exit" | "quit" | ":q" => return ReplCommand::Exit,
        "help" | "?" => return ReplCommand::Help,
        ":docs" => return ReplCommand::Docs,
        ":history" => return ReplCommand::History,
        _ => {}
    }

    if let Some(rest) = line.strip_prefix(":use") {
        let name = rest.trim();
        if name.is_empty() {
            return ReplCommand::Invalid("Usage: :use <file>".to_string());
        }
        return ReplCommand::Use(name.to_string());
    }

    if line.starts_with(':') {
        return ReplCommand::Invalid(format!(
            "Unknown command: {}. Type 'help' for available commands.",
            line
        ));
    }

    ReplCommand::Question(line.to_string())
}

/// Build the answering model only when a question will reach it
fn ensure_ready(app: &App, file: Option<&str>) -> Result<()> {
    let loaded = file
        .and_then(DocumentId::from_filename)
        .is_some_and(|id| app.documents().registry().is_loaded(&id));
    if loaded {
        app.ensure_query_ready()?;
    }
    Ok(())
}

fn print_history(history: &[ChatTurn]) {
    for turn in history {
        println!("Q: {}", turn.question);
        println!("A: {}", turn.answer);
        println!();
    }
}

fn editor_error(e: ReadlineError) -> CliError {
    CliError::Io(std::io::Error::other(format!(
        "Failed to initialize editor: {}",
        e
    )))
}

fn get_history_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
    let dir = home.join(".ledgerlens");
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("history.txt"))
}

fn print_help(formatter: &Formatter) {
    println!("{}", formatter.info("Available commands:"));
    println!();
    println!("  <question>          - Ask about the selected document");
    println!("  :use <file>         - Switch to another uploaded document");
    println!("  :docs               - List uploaded documents");
    println!("  :history            - Show this session's questions and answers");
    println!("  help, ?             - Show this help");
    println!("  exit, quit, :q      - Leave the chat");
    println!();
}
