//! Upload command implementation.

use crate::app::App;
use crate::cli::{ProcessArgs, UploadArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;

/// Execute the upload command.
pub async fn execute_upload(args: UploadArgs, app: &App, formatter: &Formatter) -> Result<()> {
    if !args.path.is_file() {
        return Err(CliError::InvalidInput(format!(
            "{} is not a file",
            args.path.display()
        )));
    }

    let file_name = app.documents().upload(&args.path)?;
    println!("{}", formatter.success(&format!("Uploaded {}", file_name)));

    if args.process {
        super::execute_process(
            ProcessArgs {
                file: Some(file_name),
            },
            app,
            formatter,
        )
        .await?;
    }

    Ok(())
}
