//! Serve command implementation.

use crate::cli::ServeArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the serve command.
pub async fn execute_serve(args: ServeArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut server = config.server_config();
    if let Some(address) = args.bind_address {
        server.bind_address = address;
    }
    if let Some(port) = args.port {
        server.bind_port = port;
    }

    eprintln!(
        "{}",
        formatter.info(&format!("Serving graphs on http://{}", server.bind_addr()))
    );
    ledgerlens_server::start_server(server).await?;
    Ok(())
}
