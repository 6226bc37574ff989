//! View command implementation.

use crate::app::App;
use crate::cli::ViewArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use ledgerlens_domain::DocumentId;

/// Execute the view command.
pub async fn execute_view(args: ViewArgs, app: &App, formatter: &Formatter) -> Result<()> {
    let documents = app.documents();

    if args.html {
        println!("{}", documents.load_visualization(args.file.as_deref()));
        return Ok(());
    }

    let file_name = args
        .file
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .ok_or_else(|| CliError::InvalidInput("Please select a document.".to_string()))?;

    let Some(path) = documents.graph_artifact(file_name) else {
        println!(
            "{}",
            formatter.warning(&format!(
                "Graph not found for '{}'. Please process the document first.",
                file_name
            ))
        );
        return Ok(());
    };

    let document = DocumentId::from_filename(file_name)
        .ok_or_else(|| CliError::InvalidInput(format!("Invalid file name: {}", file_name)))?;

    println!("{}", documents.graph_url(&document));
    println!("{}", formatter.info(&format!("File: {}", path.display())));
    Ok(())
}
