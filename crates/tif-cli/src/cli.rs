//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Keep wiki tiddlers in sync with external files
#[derive(Parser, Debug)]
#[command(name = "tif")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Wiki file to work on (defaults to wiki.json in the current directory)
    #[arg(short, long, global = true, env = "TIF_WIKI")]
    pub wiki: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show registered external tiddlers and where their files live
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Load every external file and report the outcome
    Load {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Load, then write external files and the wiki file
    ///
    /// Examples:
    ///   tif save                 # Save next to ./wiki.json
    ///   tif save -w notes.json   # Save another wiki
    Save {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Add a registration directive to the list tiddler
    Register {
        /// Title of the tiddler to externalize
        name: String,

        /// File name, directory (ending in /) or path
        #[arg(short, long, default_value = "")]
        file: String,

        /// File format
        #[arg(short = 'F', long)]
        format: Option<String>,

        /// Hand the tiddler to the extension loader after loading
        #[arg(long)]
        plugin: bool,

        /// Keep the tiddler in the wiki file as well
        #[arg(long)]
        keep_internal: bool,
    },

    /// List available file formats
    Formats {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_register_with_options() {
        let cli = Cli::parse_from([
            "tif",
            "register",
            "My Log",
            "--file",
            "../logs/",
            "-F",
            "externalized",
            "--keep-internal",
        ]);
        assert_eq!(
            cli.command,
            Some(Commands::Register {
                name: "My Log".into(),
                file: "../logs/".into(),
                format: Some("externalized".into()),
                plugin: false,
                keep_internal: true,
            })
        );
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["tif", "status", "--json", "-v", "-w", "other.json"]);
        assert!(cli.verbose);
        assert_eq!(cli.wiki, Some(PathBuf::from("other.json")));
        assert_eq!(cli.command, Some(Commands::Status { json: true }));
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
