//! Register command implementation

use std::path::Path;

use colored::Colorize;
use tif_core::{HostStore, MemoryStore, Registration, render_directive, tiddler_ref};
use tif_content::Tiddler;

use crate::context::WikiContext;
use crate::error::Result;

/// Options of the register command
#[derive(Debug, Clone, Default)]
pub struct RegisterArgs {
    pub name: String,
    pub file: String,
    pub format: Option<String>,
    pub plugin: bool,
    pub keep_internal: bool,
}

/// Append a directive to the list tiddler and save the wiki file.
///
/// Creates the wiki file if it does not exist. Returns the directive text.
pub fn run_register(cwd: &Path, wiki: Option<&Path>, args: RegisterArgs) -> Result<String> {
    let context = WikiContext::resolve(cwd, wiki)?;
    let mut store = if context.exists() {
        context.load_store()?
    } else {
        MemoryStore::new()
    };

    let format = args
        .format
        .unwrap_or_else(|| context.config.default_format.clone());
    let registration = Registration::new(args.name)
        .with_file(args.file)
        .with_format(format)
        .with_plugin(args.plugin)
        .with_keep_internal(args.keep_internal);
    let directive = render_directive(&registration);

    let list_name = &context.config.list_tiddler;
    let list = store
        .fetch_tiddler(list_name)
        .unwrap_or_else(|| tiddler_ref(Tiddler::new(list_name.as_str())));
    {
        let mut list = list.borrow_mut();
        if !list.text.is_empty() && !list.text.ends_with('\n') {
            list.text.push('\n');
        }
        list.text.push_str(&directive);
    }
    store.add_tiddler(list);
    store.save(&context.wiki)?;

    println!(
        "{} {} in {}",
        "Registered".green().bold(),
        registration.name.cyan(),
        list_name
    );
    println!("  {}", directive.dimmed());
    Ok(directive)
}
