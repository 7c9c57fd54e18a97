//! Named weighting strategies over the four score components.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::components::ScoreComponents;
use crate::error::ScoringError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Favors short tasks.
    FastestWins,
    /// Favors importance, with a little fan-out.
    HighImpact,
    /// Favors the nearest deadlines.
    DeadlineDriven,
    #[default]
    SmartBalance,
}

/// Fixed weight vector of a strategy. Each one sums to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub urgency: f64,
    pub importance: f64,
    pub quick_win: f64,
    pub dependency: f64,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::FastestWins,
        Strategy::HighImpact,
        Strategy::DeadlineDriven,
        Strategy::SmartBalance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::FastestWins => "fastest_wins",
            Strategy::HighImpact => "high_impact",
            Strategy::DeadlineDriven => "deadline_driven",
            Strategy::SmartBalance => "smart_balance",
        }
    }

    pub fn weights(self) -> Weights {
        let (urgency, importance, quick_win, dependency) = match self {
            Strategy::FastestWins => (0.2, 0.2, 0.6, 0.0),
            Strategy::HighImpact => (0.2, 0.7, 0.0, 0.1),
            Strategy::DeadlineDriven => (0.7, 0.2, 0.1, 0.0),
            Strategy::SmartBalance => (0.35, 0.35, 0.15, 0.15),
        };
        Weights {
            urgency,
            importance,
            quick_win,
            dependency,
        }
    }

    /// Base score in [0, 1], before any cycle penalty.
    pub fn combine(self, c: &ScoreComponents) -> f64 {
        let w = self.weights();
        w.urgency * c.urgency
            + w.importance * c.importance_norm
            + w.quick_win * c.quick_win
            + w.dependency * c.dep_score
    }

    /// Comma-separated list of every strategy name.
    pub fn choices() -> String {
        Self::ALL.iter().map(|s| s.name()).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| ScoringError::InvalidStrategy(s.to_string()))
    }
}
