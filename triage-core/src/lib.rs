//! triage-core: scoring engine for ranking a batch of tasks.
//!
//! Data flows one way: raw payload -> [`TaskRecord`]s -> [`DependencyGraph`]
//! -> cycle set -> [`ScoreComponents`] -> [`Strategy`] score -> penalty and
//! scale -> sort and rank -> [`Summary`]. Nothing here holds state between
//! calls.

pub mod components;
pub mod error;
pub mod explain;
pub mod graph;
pub mod ranking;
pub mod strategy;
pub mod task;
pub mod time;

pub use components::ScoreComponents;
pub use error::ScoringError;
pub use explain::build_explanation;
pub use graph::DependencyGraph;
pub use ranking::{AnalysisResult, CYCLE_PENALTY, ScoredTask, Summary, score, score_records};
pub use strategy::{Strategy, Weights};
pub use task::{TaskId, TaskRecord, parse_tasks};
