//! Save command implementation

use std::path::Path;

use colored::Colorize;
use serde::Serialize;
use tif_core::{LoadReport, SaveOutcome, SessionSave};

use crate::commands::load::print_load_report;
use crate::context::WikiContext;
use crate::error::{CliError, Result};

#[derive(Debug, Serialize)]
struct SaveRun {
    load: LoadReport,
    save: SessionSave,
}

/// Run the save command
///
/// External files are loaded first so tiddlers that only live in files are
/// present when the wiki file is written.
pub async fn run_save(cwd: &Path, wiki: Option<&Path>, json: bool) -> Result<()> {
    let context = WikiContext::resolve(cwd, wiki)?;
    let mut session = context.session()?;
    let load = session.start().await;
    let save = session.save_changes()?;
    let failures = save.external.failures().count();

    if json {
        println!("{}", serde_json::to_string_pretty(&SaveRun { load, save })?);
    } else {
        print_load_report(&load);
        println!();
        print_save(&save);
    }

    if failures > 0 {
        return Err(CliError::user(format!(
            "{failures} external tiddler(s) could not be saved"
        )));
    }
    Ok(())
}

fn print_save(save: &SessionSave) {
    println!("{}", "Save".bold());
    for entry in &save.external.entries {
        let name = entry.name.cyan();
        match &entry.outcome {
            SaveOutcome::Written { path } => println!("  {} {} -> {}", "+".green(), name, path),
            SaveOutcome::Unchanged { path } => {
                println!("  {} {} -> {} (unchanged)", "=".dimmed(), name, path)
            }
            SaveOutcome::Skipped { .. } => {
                println!("  {} {} (no such tiddler)", "-".dimmed(), name)
            }
            SaveOutcome::UnsupportedTarget { path } => {
                println!("  {} {} -> {} (remote, not saved)", "-".yellow(), name, path)
            }
            SaveOutcome::UnknownFormat { format } => {
                println!("  {} {} (unknown format {})", "x".red(), name, format)
            }
            SaveOutcome::WriteFailed { path, message } => {
                println!("  {} {} -> {} ({})", "x".red(), name, path, message)
            }
        }
    }
    if let Some(count) = save.wiki_tiddlers {
        println!("  {} wiki file ({} tiddlers)", "+".green(), count);
    }
}
