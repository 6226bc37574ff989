//! Ask command implementation.

use crate::app::App;
use crate::cli::AskArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use ledgerlens_domain::DocumentId;
use ledgerlens_pipeline::NOT_LOADED_MESSAGE;

/// Execute the ask command.
pub async fn execute_ask(args: AskArgs, app: &App, formatter: &Formatter) -> Result<()> {
    let question = args.question.join(" ");
    if question.trim().is_empty() {
        return Err(CliError::InvalidInput("Question is empty".to_string()));
    }

    let document = DocumentId::from_filename(args.file.trim())
        .ok_or_else(|| CliError::InvalidInput(format!("Invalid file name: {}", args.file)))?;

    if !app.documents().registry().is_loaded(&document) {
        println!("{}", formatter.warning(NOT_LOADED_MESSAGE));
        return Ok(());
    }

    app.ensure_query_ready()?;
    let answer = app.query().answer(&document, &question).await;
    println!("{}", formatter.answer(&answer));
    Ok(())
}
