//! Worldstate Runtime
//!
//! Drives the providers and persists the result:
//! - Orchestrator: runs all seven providers and assembles the snapshot
//! - Output: atomic overwrite of the JSON artifact
//! - Probe: one-shot reachability check of every external source

pub mod orchestrator;
pub mod output;
pub mod probe;

pub use orchestrator::*;
pub use output::*;
pub use probe::*;
