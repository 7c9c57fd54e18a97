//! Analysis service: the analyze and suggest operations behind the HTTP API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use triage_core::{AnalysisResult, ScoredTask, Strategy, Summary, parse_tasks, score_records};

use crate::config::ScoringSection;
use crate::store::{LatestAnalysis, LatestAnalysisStore};
use crate::validate::{ValidationErrors, validate_analyze_request};

const NO_ANALYSIS: &str = "No analysis available. POST to /api/tasks/analyze/ first.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("invalid request: {0}")]
    Invalid(#[from] ValidationErrors),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) | ApiError::Invalid(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::PayloadTooLarge(_) => 413,
            ApiError::Internal(_) => 500,
        }
    }

    /// JSON error body.
    pub fn body(&self) -> Value {
        match self {
            ApiError::Invalid(errors) => json!({ "errors": errors }),
            ApiError::Internal(_) => json!({ "detail": "Internal server error." }),
            other => json!({ "detail": other.to_string() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub analysis: AnalysisResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestResponse {
    pub generated_at: DateTime<Utc>,
    pub strategy: Strategy,
    pub limit: i64,
    pub tasks: Vec<ScoredTask>,
    pub summary: Summary,
}

/// Raw suggest query parameters, as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestQuery {
    pub strategy: Option<String>,
    pub limit: Option<String>,
}

/// Owns the latest-analysis slot; everything else is per call.
#[derive(Debug)]
pub struct AnalysisService {
    scoring: ScoringSection,
    store: LatestAnalysisStore,
    fixed_date: Option<NaiveDate>,
}

impl AnalysisService {
    pub fn new(scoring: ScoringSection) -> Self {
        Self {
            scoring,
            store: LatestAnalysisStore::new(),
            fixed_date: None,
        }
    }

    /// Score against `date` instead of the current day.
    pub fn with_fixed_date(mut self, date: NaiveDate) -> Self {
        self.fixed_date = Some(date);
        self
    }

    pub fn store(&self) -> &LatestAnalysisStore {
        &self.store
    }

    fn evaluation_date(&self) -> Result<NaiveDate, ApiError> {
        match self.fixed_date {
            Some(d) => Ok(d),
            None => Ok(self.scoring.today()?),
        }
    }

    /// Validate, score and cache a submitted batch.
    pub fn analyze(&self, body: &Value) -> Result<AnalyzeResponse, ApiError> {
        let request = validate_analyze_request(body, self.scoring.default_strategy)
            .inspect_err(|errors| tracing::warn!(%errors, "analyze request rejected"))?;

        let tasks = parse_tasks(&request.tasks).map_err(|e| ApiError::BadRequest(e.to_string()))?;
        let analysis = score_records(&tasks, request.strategy, Some(self.evaluation_date()?));
        let generated_at = Utc::now();

        tracing::info!(
            strategy = %request.strategy,
            tasks = tasks.len(),
            average = analysis.summary.average_score,
            "batch analyzed"
        );

        self.store.replace(LatestAnalysis {
            generated_at,
            tasks,
            analysis: analysis.clone(),
        });

        Ok(AnalyzeResponse {
            generated_at,
            analysis,
        })
    }

    /// Top tasks of the latest batch, re-scored under the requested strategy.
    pub fn suggest(&self, query: &SuggestQuery) -> Result<SuggestResponse, ApiError> {
        let latest = self
            .store
            .latest()
            .ok_or_else(|| ApiError::NotFound(NO_ANALYSIS.to_string()))?;

        let strategy = match query.strategy.as_deref() {
            None => self.scoring.default_strategy,
            Some(name) => name.parse::<Strategy>().map_err(|_| {
                ApiError::BadRequest(format!("strategy must be one of {}.", Strategy::choices()))
            })?,
        };

        let limit = match query.limit.as_deref() {
            None => self.scoring.suggest_limit,
            Some(text) => text.trim().parse::<i64>().map_err(|_| {
                ApiError::BadRequest("limit must be a positive integer.".to_string())
            })?,
        }
        .max(1);

        let analysis = score_records(&latest.tasks, strategy, Some(self.evaluation_date()?));
        let tasks = analysis
            .tasks
            .into_iter()
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect();

        Ok(SuggestResponse {
            generated_at: latest.generated_at,
            strategy,
            limit,
            tasks,
            summary: analysis.summary,
        })
    }
}
