//! Orchestration, aggregation and alternative generation on top of the
//! tool registry.
//!
//! # Modules
//! - `pipeline` — Concurrent, time-boxed, cancellable tool execution
//! - `aggregator` — Weighted composite score with missing-weight redistribution
//! - `insights` — Typed summary of tool observations
//! - `alternatives` — Deterministic variant generation
//! - `engine` — `run_analysis` / `generate_alternatives` entry points

pub mod aggregator;
pub mod alternatives;
pub mod engine;
pub mod insights;
pub mod pipeline;

pub use aggregator::{Aggregate, Aggregator, ScoreSource};
pub use alternatives::AlternativeGenerator;
pub use engine::AnalysisEngine;
pub use insights::CopyInsights;
pub use pipeline::Pipeline;
