//! List command implementation.

use crate::app::App;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the list command.
pub async fn execute_list(app: &App, formatter: &Formatter) -> Result<()> {
    let documents = app.documents().list_documents()?;
    println!("{}", formatter.format_documents(&documents)?);
    Ok(())
}
