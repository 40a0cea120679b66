use clap::Parser;
use tracing_subscriber::EnvFilter;

use texindex::cli::{self, Cli, Command};
use texindex::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol stream, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        None | Some(Command::Serve) => server::serve().await,
        Some(Command::Index { file, json }) => print!("{}", cli::index(&file, json)?),
    }

    Ok(())
}
