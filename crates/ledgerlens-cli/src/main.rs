//! LedgerLens CLI - 10-K knowledge graphs from the command line.

use clap::Parser;
use ledgerlens_cli::commands;
use ledgerlens_cli::repl;
use ledgerlens_cli::{App, Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> ledgerlens_cli::Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_init(cli.config.as_deref())?;

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    // The graph server opens its own view of the data directory
    if let Some(Command::Serve(args)) = cli.command {
        return commands::execute_serve(args, &config, &formatter).await;
    }

    let app = App::open(config)?;

    match cli.command {
        None => repl::run_chat(&app, None, &formatter).await?,
        Some(Command::Chat(args)) => repl::run_chat(&app, args.file, &formatter).await?,
        Some(Command::Upload(args)) => commands::execute_upload(args, &app, &formatter).await?,
        Some(Command::List) => commands::execute_list(&app, &formatter).await?,
        Some(Command::Process(args)) => commands::execute_process(args, &app, &formatter).await?,
        Some(Command::View(args)) => commands::execute_view(args, &app, &formatter).await?,
        Some(Command::Ask(args)) => commands::execute_ask(args, &app, &formatter).await?,
        Some(Command::Delete(args)) => commands::execute_delete(args, &app, &formatter).await?,
        Some(Command::Serve(_)) => {}
    }

    Ok(())
}
