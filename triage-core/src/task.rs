//! Task records and the parser that turns loosely-typed task dictionaries
//! into them.
//!
//! The parser sits behind the request validation layer, but still re-coerces
//! every field: raw payloads may come from files, tests or other callers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, ScoringError};
use crate::time::parse_due_date;

pub type TaskId = u64;

/// One task of a batch. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub title: String,

    /// `None` means "no deadline".
    pub due_date: Option<NaiveDate>,

    pub estimated_hours: f64,

    /// 1-10, higher means more important.
    pub importance: i64,

    /// Ids of tasks in the same batch that must happen first.
    pub dependencies: Vec<TaskId>,
}

impl TaskRecord {
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            due_date: None,
            estimated_hours: 2.0,
            importance: 5,
            dependencies: Vec::new(),
        }
    }

    pub fn with_due_date(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = hours;
        self
    }

    pub fn with_importance(mut self, importance: i64) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = TaskId>) -> Self {
        self.dependencies = deps.into_iter().collect();
        self
    }
}

/// Parse raw task dictionaries, preserving input order.
///
/// Fails on the first malformed task; the whole batch is rejected.
pub fn parse_tasks(payload: &[Value]) -> Result<Vec<TaskRecord>> {
    payload
        .iter()
        .enumerate()
        .map(|(i, raw)| parse_task(i + 1, raw))
        .collect()
}

fn parse_task(index: usize, raw: &Value) -> Result<TaskRecord> {
    let obj = raw
        .as_object()
        .ok_or_else(|| ScoringError::conversion(index, "task", "must be an object"))?;

    let id = match field(obj, "id") {
        Some(v) if is_truthy(v) => coerce_id(index, "id", v)?,
        _ => index as TaskId,
    };

    let title = match field(obj, "title") {
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(ScoringError::conversion(index, "title", "must be text")),
        None => return Err(ScoringError::MissingField { index, field: "title" }),
    };

    let due_date = match field(obj, "due_date") {
        None => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(parse_due_date(s).ok_or_else(|| {
            ScoringError::conversion(index, "due_date", format!("is not a valid date: '{s}'"))
        })?),
        Some(_) => return Err(ScoringError::conversion(index, "due_date", "must be date text")),
    };

    let estimated_hours =
        coerce_f64(index, "estimated_hours", required(obj, index, "estimated_hours")?)?;
    let importance = coerce_i64(index, "importance", required(obj, index, "importance")?)?;

    let dependencies = match field(obj, "dependencies") {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| coerce_id(index, "dependencies", v))
            .collect::<Result<Vec<_>>>()?,
        Some(_) => return Err(ScoringError::conversion(index, "dependencies", "must be a list")),
    };

    Ok(TaskRecord {
        id,
        title,
        due_date,
        estimated_hours,
        importance,
        dependencies,
    })
}

/// A present, non-null field.
fn field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn required<'a>(obj: &'a Map<String, Value>, index: usize, key: &'static str) -> Result<&'a Value> {
    match obj.get(key) {
        Some(Value::Null) => Err(ScoringError::conversion(index, key, "must not be null")),
        Some(v) => Ok(v),
        None => Err(ScoringError::MissingField { index, field: key }),
    }
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn coerce_id(index: usize, key: &'static str, v: &Value) -> Result<TaskId> {
    let id = match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<TaskId>().ok(),
        _ => None,
    };
    id.ok_or_else(|| ScoringError::conversion(index, key, format!("expected a task id, got {v}")))
}

fn coerce_f64(index: usize, key: &'static str, v: &Value) -> Result<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|f| f.is_finite())
        .ok_or_else(|| ScoringError::conversion(index, key, format!("expected a number, got {v}")))
}

fn coerce_i64(index: usize, key: &'static str, v: &Value) -> Result<i64> {
    let n = match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    n.ok_or_else(|| ScoringError::conversion(index, key, format!("expected an integer, got {v}")))
}
