//! Process command implementation.

use crate::app::App;
use crate::cli::ProcessArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use ledgerlens_domain::DocumentId;
use ledgerlens_pipeline::ProgressMessage;
use std::cell::Cell;
use std::time::{Duration, Instant};

/// Silence after which a still-working line is printed
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

/// Execute the process command.
///
/// Stage markers go to stderr so stdout carries only the result.
pub async fn execute_process(args: ProcessArgs, app: &App, formatter: &Formatter) -> Result<()> {
    if needs_model(app, args.file.as_deref()) {
        app.ensure_extraction_ready()?;
    }

    let last_output = Cell::new(Instant::now());
    let last_fraction = Cell::new(0.0_f32);

    let mut receiver = app.documents().process(args.file.as_deref());
    let terminal = receiver
        .wait_with_heartbeat(
            |fraction, text| {
                eprintln!("{}", formatter.progress(fraction, text));
                last_fraction.set(fraction);
                last_output.set(Instant::now());
            },
            || {
                if last_output.get().elapsed() >= HEARTBEAT_INTERVAL {
                    eprintln!("{}", formatter.progress(last_fraction.get(), "Processing..."));
                    last_output.set(Instant::now());
                }
            },
        )
        .await;

    match terminal {
        Some(ProgressMessage::Complete { text, document, .. }) => {
            println!("{}", formatter.success(&text));
            println!(
                "{}",
                formatter.info(&format!("Graph: {}", app.documents().graph_url(&document)))
            );
            Ok(())
        }
        Some(ProgressMessage::Error(text)) => Err(CliError::Processing(text)),
        Some(ProgressMessage::Progress { .. }) | None => Err(CliError::Processing(
            "Processing stopped without a result".to_string(),
        )),
    }
}

/// True when the run will reach the extraction model
fn needs_model(app: &App, file_name: Option<&str>) -> bool {
    let Some(file_name) = file_name.map(str::trim).filter(|f| !f.is_empty()) else {
        return false;
    };
    let Some(document) = DocumentId::from_filename(file_name) else {
        return false;
    };
    let store = app.documents().store();
    store.upload_path(file_name).is_some() && !store.has_cached_artifacts(&document)
}
