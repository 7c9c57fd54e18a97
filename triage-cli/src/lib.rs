//! triage-cli: configuration, request validation, the latest-analysis store
//! and the HTTP service around `triage-core`.

pub mod api;
pub mod config;
pub mod http;
pub mod remote;
pub mod state;
pub mod store;
pub mod validate;

pub use api::{AnalysisService, AnalyzeResponse, ApiError, SuggestQuery, SuggestResponse};
pub use config::{Config, load_config};
pub use store::{LatestAnalysis, LatestAnalysisStore};
