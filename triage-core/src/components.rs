//! Component score calculators. Each maps one task attribute to [0, 1].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::task::TaskRecord;

/// Urgency for tasks without a deadline.
pub const NO_DEADLINE_URGENCY: f64 = 0.1;
/// Urgency decays linearly to zero over this many days.
pub const MAX_URGENCY_DAYS: i64 = 30;
/// Hours at or beyond which a task is no longer a quick win.
pub const QUICK_WIN_HOURS_CAP: f64 = 8.0;

/// Normalized per-task components, rounded to 4 places.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub urgency: f64,
    pub importance_norm: f64,
    pub quick_win: f64,
    pub dep_score: f64,
    pub num_dependents: usize,
    /// Whole days until the due date; negative when overdue.
    pub days_left: Option<i64>,
}

impl ScoreComponents {
    pub fn compute(
        task: &TaskRecord,
        num_dependents: usize,
        max_dependents: usize,
        today: NaiveDate,
    ) -> Self {
        let (urgency, days_left) = urgency(task.due_date, today);
        Self {
            urgency: round_to(urgency, 4),
            importance_norm: round_to(importance(task.importance), 4),
            quick_win: round_to(quick_win(task.estimated_hours), 4),
            dep_score: round_to(dependency(num_dependents, max_dependents), 4),
            num_dependents,
            days_left,
        }
    }
}

/// Proximity to the deadline: overdue is 1.0, 30+ days out is 0.0.
pub fn urgency(due: Option<NaiveDate>, today: NaiveDate) -> (f64, Option<i64>) {
    let Some(due) = due else {
        return (NO_DEADLINE_URGENCY, None);
    };

    let days_left = (due - today).num_days();
    if days_left < 0 {
        return (1.0, Some(days_left));
    }

    let decay = days_left.min(MAX_URGENCY_DAYS) as f64 / MAX_URGENCY_DAYS as f64;
    ((1.0 - decay).max(0.0), Some(days_left))
}

pub fn importance(value: i64) -> f64 {
    (value as f64 / 10.0).clamp(0.0, 1.0)
}

/// Shorter tasks score higher; 0h is 1.0, 8h and beyond is 0.0.
pub fn quick_win(hours: f64) -> f64 {
    1.0 - hours.clamp(0.0, QUICK_WIN_HOURS_CAP) / QUICK_WIN_HOURS_CAP
}

/// Fan-out relative to the batch maximum. Zero when nothing has dependents.
pub fn dependency(num_dependents: usize, max_dependents: usize) -> f64 {
    if max_dependents == 0 {
        return 0.0;
    }
    num_dependents as f64 / max_dependents as f64
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
