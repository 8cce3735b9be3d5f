//! Shared test utilities for the tiddler-in-file workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`wiki`]: [`TestWiki`](wiki::TestWiki), a wiki file in a temporary directory

pub mod wiki;

pub use wiki::{TestWiki, list_tiddler};
