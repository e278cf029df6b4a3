//! FileBot CLI: chat with a remote file store.
//!
//! Browse folders, search file contents, and talk to the answer service
//! from the terminal.

mod commands;
mod render;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
