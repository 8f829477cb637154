//! Reconnaissance aggregator: classifies a target, fans out to independent
//! network probes, merges the partial results and scores them.

pub mod config;
pub mod core;
pub mod logging;
