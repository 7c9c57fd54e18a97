//! Scoring entry points: penalize cycles, scale, rank and summarize.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::components::{ScoreComponents, round_to};
use crate::error::Result;
use crate::explain::build_explanation;
use crate::graph::DependencyGraph;
use crate::strategy::Strategy;
use crate::task::{TaskRecord, parse_tasks};

/// Multiplier applied to the base score of tasks on a dependency cycle.
pub const CYCLE_PENALTY: f64 = 0.2;

/// How many titles the summary lists.
const SUMMARY_TOP: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTask {
    #[serde(flatten)]
    pub task: TaskRecord,
    /// 0-100, two decimals.
    pub score: f64,
    pub explanation: String,
    pub cycle_issue: bool,
    pub components: ScoreComponents,
    /// 1-based position after sorting.
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub strategy: Strategy,
    pub total_tasks: usize,
    pub average_score: f64,
    pub top_titles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub strategy: Strategy,
    /// Descending by score; ties keep input order.
    pub tasks: Vec<ScoredTask>,
    pub summary: Summary,
}

/// Parse raw task dictionaries and score them.
///
/// `evaluation_date` defaults to today's local date.
pub fn score(
    raw_tasks: &[Value],
    strategy: Strategy,
    evaluation_date: Option<NaiveDate>,
) -> Result<AnalysisResult> {
    let records = parse_tasks(raw_tasks)?;
    Ok(score_records(&records, strategy, evaluation_date))
}

/// Score already-parsed records.
pub fn score_records(
    records: &[TaskRecord],
    strategy: Strategy,
    evaluation_date: Option<NaiveDate>,
) -> AnalysisResult {
    let today = evaluation_date.unwrap_or_else(|| Local::now().date_naive());

    let graph = DependencyGraph::build(records);
    let cycle_nodes = graph.find_cycles();
    if !cycle_nodes.is_empty() {
        tracing::debug!(count = cycle_nodes.len(), "dependency cycle detected");
    }
    let max_dependents = graph.max_dependents();

    let mut tasks: Vec<ScoredTask> = records
        .iter()
        .map(|task| {
            let num_dependents = graph.dependent_count(task.id);
            let components = ScoreComponents::compute(task, num_dependents, max_dependents, today);
            let cycle_issue = cycle_nodes.contains(&task.id);

            let mut base = strategy.combine(&components);
            if cycle_issue {
                base *= CYCLE_PENALTY;
            }

            ScoredTask {
                task: task.clone(),
                score: round_to(base * 100.0, 2),
                explanation: build_explanation(task, &components, cycle_issue),
                cycle_issue,
                components,
                rank: 0,
            }
        })
        .collect();

    // sort_by is stable: equal scores keep input order.
    tasks.sort_by(|a, b| b.score.total_cmp(&a.score));
    for (i, t) in tasks.iter_mut().enumerate() {
        t.rank = i + 1;
    }

    let summary = summarize(&tasks, strategy);
    AnalysisResult {
        strategy,
        tasks,
        summary,
    }
}

/// Aggregate statistics over ranked tasks.
pub fn summarize(tasks: &[ScoredTask], strategy: Strategy) -> Summary {
    let average_score = if tasks.is_empty() {
        0.0
    } else {
        round_to(tasks.iter().map(|t| t.score).sum::<f64>() / tasks.len() as f64, 2)
    };

    Summary {
        strategy,
        total_tasks: tasks.len(),
        average_score,
        top_titles: tasks.iter().take(SUMMARY_TOP).map(|t| t.task.title.clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn score_of(result: &AnalysisResult, title: &str) -> f64 {
        result.tasks.iter().find(|t| t.task.title == title).unwrap().score
    }

    #[test]
    fn test_overdue_beats_future_under_deadline_driven() {
        let records = vec![
            TaskRecord::new(1, "Future task").with_due_date(today() + Duration::days(10)),
            TaskRecord::new(2, "Overdue bug").with_due_date(today() - Duration::days(1)),
        ];
        let result = score_records(&records, Strategy::DeadlineDriven, Some(today()));
        assert!(score_of(&result, "Overdue bug") > score_of(&result, "Future task"));
        assert_eq!(result.tasks[0].task.title, "Overdue bug");
    }

    #[test]
    fn test_importance_dominates_high_impact() {
        let records = vec![
            TaskRecord::new(1, "Minor enhancement")
                .with_due_date(today())
                .with_hours(4.0)
                .with_importance(2),
            TaskRecord::new(2, "Critical feature")
                .with_due_date(today())
                .with_hours(4.0)
                .with_importance(10),
        ];
        let result = score_records(&records, Strategy::HighImpact, Some(today()));
        assert!(score_of(&result, "Critical feature") > score_of(&result, "Minor enhancement"));
    }

    #[test]
    fn test_foundation_task_wins_smart_balance() {
        let records = vec![
            TaskRecord::new(1, "Foundation task").with_due_date(today()).with_hours(4.0),
            TaskRecord::new(2, "Follow-up task")
                .with_due_date(today())
                .with_hours(4.0)
                .with_dependencies([1]),
        ];
        let result = score_records(&records, Strategy::SmartBalance, Some(today()));
        assert_eq!(score_of(&result, "Foundation task"), 75.0);
        assert_eq!(score_of(&result, "Follow-up task"), 60.0);
    }

    #[test]
    fn test_near_deadline_beats_far_deadline() {
        let records = vec![
            TaskRecord::new(1, "soon").with_due_date(today() + Duration::days(1)),
            TaskRecord::new(2, "later")
                .with_due_date(today() + Duration::days(20))
                .with_dependencies([1]),
        ];
        for strategy in [Strategy::DeadlineDriven, Strategy::SmartBalance] {
            let result = score_records(&records, strategy, Some(today()));
            assert!(score_of(&result, "soon") > score_of(&result, "later"), "{strategy}");
        }
    }

    #[test]
    fn test_cycle_penalty_is_eighty_percent() {
        let plain = vec![TaskRecord::new(1, "a"), TaskRecord::new(2, "b")];
        let cyclic = vec![
            TaskRecord::new(1, "a").with_dependencies([2]),
            TaskRecord::new(2, "b").with_dependencies([1]),
        ];
        // Both tasks have one dependent in the cyclic batch, so compare against
        // an acyclic batch with the same fan-out under a strategy that ignores it.
        let before = score_records(&plain, Strategy::DeadlineDriven, Some(today()));
        let after = score_records(&cyclic, Strategy::DeadlineDriven, Some(today()));

        for t in &after.tasks {
            assert!(t.cycle_issue);
            assert!(t.explanation.ends_with("Part of dependency cycle"));
            let unpenalized = score_of(&before, &t.task.title);
            assert!((t.score - unpenalized * CYCLE_PENALTY).abs() <= 0.01);
        }
    }

    #[test]
    fn test_ties_keep_input_order_and_ranks_are_contiguous() {
        let records: Vec<_> = (1..=5).map(|i| TaskRecord::new(i, format!("t{i}"))).collect();
        let result = score_records(&records, Strategy::SmartBalance, Some(today()));
        let ids: Vec<_> = result.tasks.iter().map(|t| t.task.id).collect();
        let ranks: Vec<_> = result.tasks.iter().map(|t| t.rank).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_summary() {
        let records = vec![
            TaskRecord::new(1, "a").with_hours(0.0).with_importance(10),
            TaskRecord::new(2, "b").with_hours(8.0).with_importance(1),
            TaskRecord::new(3, "c"),
            TaskRecord::new(4, "d").with_hours(6.0),
        ];
        let result = score_records(&records, Strategy::FastestWins, Some(today()));
        let mean = result.tasks.iter().map(|t| t.score).sum::<f64>() / 4.0;

        assert_eq!(result.summary.total_tasks, 4);
        assert_eq!(result.summary.average_score, round_to(mean, 2));
        assert_eq!(result.summary.top_titles, vec!["a", "c", "d"]);
        assert_eq!(result.summary.strategy, Strategy::FastestWins);
    }

    #[test]
    fn test_single_task_and_empty_batch() {
        let one = score_records(&[TaskRecord::new(1, "only")], Strategy::default(), Some(today()));
        assert_eq!(one.tasks[0].rank, 1);
        assert_eq!(one.summary.total_tasks, 1);

        let none = score_records(&[], Strategy::default(), Some(today()));
        assert!(none.tasks.is_empty());
        assert_eq!(none.summary.average_score, 0.0);
        assert!(none.summary.top_titles.is_empty());
    }

    #[test]
    fn test_score_from_raw_payload() {
        let payload = vec![
            json!({
                "title": "Fix login bug",
                "due_date": "2026-03-11",
                "estimated_hours": 3,
                "importance": 8
            }),
            json!({
                "title": "Update onboarding docs",
                "estimated_hours": 5,
                "importance": 4,
                "dependencies": [1]
            }),
        ];
        let result = score(&payload, Strategy::HighImpact, Some(today())).unwrap();
        assert_eq!(result.strategy, Strategy::HighImpact);
        assert_eq!(result.tasks.len(), 2);
        assert_eq!(result.tasks[0].task.title, "Fix login bug");
        assert_eq!(result.tasks[0].components.num_dependents, 1);
    }

    #[test]
    fn test_serialized_shape_is_flat() {
        let only = TaskRecord::new(1, "only").with_due_date(today());
        let result = score_records(&[only], Strategy::default(), Some(today()));
        let v = serde_json::to_value(&result).unwrap();
        let task = &v["tasks"][0];
        assert_eq!(task["id"], 1);
        assert_eq!(task["due_date"], "2026-03-10");
        assert_eq!(task["rank"], 1);
        assert_eq!(task["components"]["days_left"], 0);
        assert_eq!(v["strategy"], "smart_balance");
    }
}
