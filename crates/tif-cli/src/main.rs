//! Tiddler-in-file CLI
//!
//! Keeps the tiddlers registered in a wiki's list tiddler in sync with
//! their external files.

mod cli;
mod commands;
mod context;
mod error;

use std::path::Path;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use commands::register::RegisterArgs;
use error::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(cmd) => {
            let cwd = std::env::current_dir()?;
            execute_command(&cwd, cli.wiki.as_deref(), cmd).await
        }
        None => {
            println!("{} tiddler-in-file sync", "tif".green().bold());
            println!();
            println!("Run {} for available commands.", "tif --help".cyan());
            Ok(())
        }
    }
}

/// DEBUG with `--verbose`; otherwise `RUST_LOG`, defaulting to warnings.
fn init_tracing(verbose: bool) {
    let result = if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber).map_err(|e| e.to_string())
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| e.to_string())
    };
    if let Err(e) = result {
        eprintln!("{}: tracing not initialized: {}", "warning".yellow(), e);
    }
    tracing::debug!("Verbose mode enabled");
}

async fn execute_command(cwd: &Path, wiki: Option<&Path>, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Status { json } => commands::run_status(cwd, wiki, json),
        Commands::Load { json } => commands::run_load(cwd, wiki, json).await,
        Commands::Save { json } => commands::run_save(cwd, wiki, json).await,
        Commands::Register {
            name,
            file,
            format,
            plugin,
            keep_internal,
        } => {
            let args = RegisterArgs {
                name,
                file,
                format,
                plugin,
                keep_internal,
            };
            commands::run_register(cwd, wiki, args).map(|_| ())
        }
        Commands::Formats { json } => commands::run_formats(json),
    }
}
