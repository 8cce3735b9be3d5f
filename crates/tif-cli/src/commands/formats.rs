//! Formats command implementation

use colored::Colorize;
use serde::Serialize;
use tif_content::FormatRegistry;

use crate::error::Result;

#[derive(Debug, Serialize)]
struct FormatInfo<'a> {
    id: &'a str,
    extension: &'a str,
}

/// Run the formats command
pub fn run_formats(json: bool) -> Result<()> {
    let registry = FormatRegistry::with_builtins();
    let formats: Vec<_> = registry
        .ids()
        .into_iter()
        .filter_map(|id| {
            let extension = registry.extension(id).ok()?;
            Some(FormatInfo { id, extension })
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&formats)?);
        return Ok(());
    }

    println!("{}", "Available Formats".bold());
    println!();
    for format in &formats {
        println!("  {} {} (.{})", "+".green(), format.id.cyan(), format.extension);
    }
    Ok(())
}
