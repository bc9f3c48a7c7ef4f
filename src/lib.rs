//! F1 Insights - Formula 1 historical record analysis
//!
//! Loads the drivers, races, results and driver standings tables, answers
//! eight fixed questions about them and writes a text report plus one or
//! more static charts per question.

pub mod analysis;
pub mod charts;
pub mod config;
pub mod data;
pub mod pipeline;
pub mod report;

pub use config::AnalysisConfig;
pub use pipeline::{Pipeline, PipelineError, RunOutcome};
