//! Delete command implementation.

use crate::app::App;
use crate::cli::DeleteArgs;
use crate::error::Result;
use crate::output::Formatter;
use std::io::{self, Write};

/// Execute the delete command.
pub async fn execute_delete(args: DeleteArgs, app: &App, formatter: &Formatter) -> Result<()> {
    if let (Some(file), false) = (args.file.as_deref(), args.yes) {
        print!("Delete '{}' and its cached artifacts? [y/N] ", file);
        io::stdout().flush()?;

        let mut response = String::new();
        io::stdin().read_line(&mut response)?;

        if !response.trim().eq_ignore_ascii_case("y") {
            println!("{}", formatter.info("Operation cancelled"));
            return Ok(());
        }
    }

    let status = app.documents().delete(args.file.as_deref());
    if status.starts_with("Successfully") {
        println!("{}", formatter.success(&status));
    } else {
        println!("{}", formatter.warning(&status));
    }
    Ok(())
}
