use anyhow::{Context, Result};
use brokerage_sim::api::{Cli, Command, defaults_json, run_http_server, run_simulate_command};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so JSON printed on stdout stays machine-readable.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => run_http_server(args.port)
            .await
            .with_context(|| format!("HTTP server on port {} failed", args.port))?,
        Command::Simulate(args) => println!("{}", run_simulate_command(&args)?),
        Command::Defaults => println!("{}", defaults_json()?),
    }
    Ok(())
}
