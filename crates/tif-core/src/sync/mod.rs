//! SyncEngine for keeping external tiddlers and their files in step
//!
//! This module provides:
//! - **engine**: startup loading, batch saving and delete bookkeeping
//! - **report**: per-entry outcomes and the load/save reports built from them

mod engine;
mod report;

pub use engine::{EngineState, SyncEngine, compute_checksum};
pub use report::{
    EntryReport, ExtensionStatus, LoadEvent, LoadOutcome, LoadReport, SaveOutcome, SaveReport,
    SkipReason,
};
