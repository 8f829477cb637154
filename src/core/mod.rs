// src/core/mod.rs

/// Data structures shared by the probes, the orchestrator and the front-ends.
pub mod models;

/// The error taxonomy surfaced to callers.
pub mod error;

/// Target classification and input normalisation.
pub mod target;

/// The fixed-formula risk score.
pub mod scoring;

/// Network collaborators and the orchestrator that drives them.
pub mod scanner;

pub mod auth;
pub mod store;
pub mod service;
