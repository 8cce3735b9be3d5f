//! Load command implementation

use std::path::Path;

use colored::Colorize;
use tif_core::{ExtensionStatus, LoadOutcome, LoadReport};

use crate::context::WikiContext;
use crate::error::Result;

/// Run the load command
pub async fn run_load(cwd: &Path, wiki: Option<&Path>, json: bool) -> Result<()> {
    let context = WikiContext::resolve(cwd, wiki)?;
    let mut session = context.session()?;
    let report = session.start().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_load_report(&report);
    }
    Ok(())
}

/// Print one line per entry, in completion order.
pub fn print_load_report(report: &LoadReport) {
    println!("{}", "Load".bold());
    if report.is_empty() {
        println!("  {}", "No external tiddlers".dimmed());
        return;
    }
    for entry in &report.entries {
        match &entry.outcome {
            LoadOutcome::Loaded { path, extension } => {
                let note = match extension {
                    Some(ExtensionStatus::Loaded) => " (extension loaded)".to_string(),
                    Some(ExtensionStatus::Disabled) => " (extension not run)".to_string(),
                    Some(ExtensionStatus::Failed { message }) => {
                        format!(" (extension failed: {message})")
                    }
                    None => String::new(),
                };
                println!("  {} {} <- {}{}", "+".green(), entry.name.cyan(), path, note);
            }
            LoadOutcome::Failed {
                path,
                status,
                message,
            } => {
                println!(
                    "  {} {} <- {} ({} {})",
                    "x".red(),
                    entry.name.cyan(),
                    path,
                    status,
                    message
                );
            }
            LoadOutcome::UnknownFormat { format } => {
                println!("  {} {} (unknown format {})", "x".red(), entry.name.cyan(), format);
            }
            LoadOutcome::Unresolvable { path, message } => {
                println!(
                    "  {} {} <- {} ({})",
                    "x".red(),
                    entry.name.cyan(),
                    path,
                    message
                );
            }
        }
    }
    println!(
        "  {} of {} loaded",
        report.loaded().count(),
        report.len()
    );
}
