use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use serde_json::json;
use triage_core::components::{quick_win, urgency};
use triage_core::Strategy as ScoringStrategy;
use triage_core::{CYCLE_PENALTY, ScoringError, TaskRecord, score, score_records};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
}

fn strategy() -> impl Strategy<Value = ScoringStrategy> {
    prop::sample::select(ScoringStrategy::ALL.to_vec())
}

/// Batches of up to 12 tasks with random attributes and in-batch dependencies.
fn batch() -> impl Strategy<Value = Vec<TaskRecord>> {
    prop::collection::vec(
        (
            prop::option::of(-40i64..60),
            1u32..=80,
            1i64..=10,
            prop::collection::vec(1u64..=12, 0..3),
        ),
        1..12,
    )
    .prop_map(|rows| {
        let n = rows.len() as u64;
        rows.into_iter()
            .enumerate()
            .map(|(i, (offset, tenths, importance, deps))| {
                let id = i as u64 + 1;
                let mut t = TaskRecord::new(id, format!("task {id}"))
                    .with_hours(tenths as f64 / 10.0)
                    .with_importance(importance)
                    .with_dependencies(deps.into_iter().filter(|d| *d <= n && *d != id));
                if let Some(days) = offset {
                    t = t.with_due_date(today() + Duration::days(days));
                }
                t
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn urgency_is_non_increasing_until_thirty_days(days in 0i64..30) {
        let (near, _) = urgency(Some(today() + Duration::days(days)), today());
        let (far, _) = urgency(Some(today() + Duration::days(days + 1)), today());
        prop_assert!(far <= near);
    }

    #[test]
    fn urgency_is_zero_beyond_thirty_days(days in 30i64..3650) {
        prop_assert_eq!(urgency(Some(today() + Duration::days(days)), today()).0, 0.0);
    }

    #[test]
    fn overdue_is_always_max_urgency(days in 1i64..3650) {
        let (u, left) = urgency(Some(today() - Duration::days(days)), today());
        prop_assert_eq!(u, 1.0);
        prop_assert_eq!(left, Some(-days));
    }

    #[test]
    fn quick_win_stays_in_unit_range(hours in 0.0f64..100.0) {
        let q = quick_win(hours);
        prop_assert!((0.0..=1.0).contains(&q));
    }

    #[test]
    fn ranks_are_contiguous_and_scores_descending(tasks in batch(), s in strategy()) {
        let result = score_records(&tasks, s, Some(today()));
        prop_assert_eq!(result.tasks.len(), tasks.len());
        for (i, t) in result.tasks.iter().enumerate() {
            prop_assert_eq!(t.rank, i + 1);
            prop_assert!((0.0..=100.0).contains(&t.score));
        }
        for pair in result.tasks.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                prop_assert!(pair[0].task.id < pair[1].task.id);
            }
        }
    }

    #[test]
    fn summary_average_is_rounded_mean(tasks in batch(), s in strategy()) {
        let result = score_records(&tasks, s, Some(today()));
        let mean = result.tasks.iter().map(|t| t.score).sum::<f64>() / result.tasks.len() as f64;
        prop_assert!((result.summary.average_score - mean).abs() <= 0.005 + 1e-9);
        prop_assert_eq!(result.summary.total_tasks, tasks.len());
        prop_assert_eq!(result.summary.top_titles.len(), tasks.len().min(3));
    }

    #[test]
    fn no_dependents_means_zero_dep_score(tasks in batch(), s in strategy()) {
        let flat: Vec<_> = tasks.into_iter().map(|t| t.with_dependencies([])).collect();
        let result = score_records(&flat, s, Some(today()));
        prop_assert!(result.tasks.iter().all(|t| t.components.dep_score == 0.0));
        prop_assert!(result.tasks.iter().all(|t| !t.cycle_issue));
    }

    #[test]
    fn cyclic_tasks_keep_a_fifth_of_their_score(tasks in batch(), s in strategy()) {
        let result = score_records(&tasks, s, Some(today()));
        for t in result.tasks.iter().filter(|t| t.cycle_issue) {
            let unpenalized = s.combine(&t.components) * 100.0;
            prop_assert!((t.score - unpenalized * CYCLE_PENALTY).abs() <= 0.006);
        }
    }
}

#[test]
fn no_due_date_is_fixed_low_urgency() {
    let someday = TaskRecord::new(1, "someday");
    let result = score_records(&[someday], ScoringStrategy::default(), Some(today()));
    let c = &result.tasks[0].components;
    assert_eq!(c.urgency, 0.1);
    assert_eq!(c.days_left, None);
}

#[test]
fn unknown_strategy_is_rejected() {
    let err = "bogus".parse::<ScoringStrategy>().unwrap_err();
    assert_eq!(err, ScoringError::InvalidStrategy("bogus".to_string()));
}

#[test]
fn malformed_task_rejects_whole_batch() {
    let payload = vec![
        json!({"title": "fine", "estimated_hours": 1, "importance": 5}),
        json!({"title": "broken", "estimated_hours": "n/a", "importance": 5}),
    ];
    let err = score(&payload, ScoringStrategy::default(), Some(today())).unwrap_err();
    assert!(matches!(err, ScoringError::TypeConversion { index: 2, .. }));
}
