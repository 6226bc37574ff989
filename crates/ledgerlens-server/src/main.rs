//! LedgerLens graph server
//!
//! Serves rendered knowledge graphs over HTTP.

use ledgerlens_server::{config::ServerConfig, start_server, ServerError};
use std::env;
use std::process;
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
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        ServerConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        eprintln!("No config file specified, using defaults");
        ServerConfig::default()
    };

    start_server(config).await
}

fn print_help() {
    println!("LedgerLens graph server");
    println!();
    println!("USAGE:");
    println!("    ledgerlens-server [--config <path-to-config.toml>]");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("CONFIGURATION:");
    println!("    bind_address    IP address to bind (default '0.0.0.0')");
    println!("    bind_port       Port number (default 7861)");
    println!("    data_dir        Directory holding uploads and artifacts (default 'data')");
    println!();
    println!("ENDPOINTS:");
    println!("    GET /graphs/<id>.html    Rendered graph page");
    println!("    GET /documents           Uploaded documents and graph state");
    println!("    GET /health              Liveness check");
}
