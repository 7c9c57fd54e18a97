//! Request validation for analyze submissions.
//!
//! Guarantees what the scoring engine assumes: a non-empty batch, positional
//! ids, numeric fields in range, and dependencies that point at other tasks
//! of the same batch. Every problem in the batch is collected before
//! rejecting it.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fmt;
use triage_core::Strategy;

const DEFAULT_HOURS: f64 = 2.0;
const MIN_HOURS: f64 = 0.1;
const DEFAULT_IMPORTANCE: i64 = 5;

/// A validated request: cleaned task dictionaries ready for the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub strategy: Strategy,
    pub tasks: Vec<Value>,
}

/// Field path -> messages, e.g. `tasks[1].title`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, msgs)| format!("{field}: {}", msgs.join(" ")))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

pub fn validate_analyze_request(
    body: &Value,
    default_strategy: Strategy,
) -> Result<ValidatedRequest, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let Some(obj) = body.as_object() else {
        errors.add("non_field_errors", "Invalid data. Expected a dictionary.");
        return Err(errors);
    };

    let strategy = match obj.get("strategy") {
        None | Some(Value::Null) => default_strategy,
        Some(Value::String(s)) if s.trim().is_empty() => {
            errors.add("strategy", "This field may not be blank.");
            default_strategy
        }
        Some(Value::String(s)) => s.parse().unwrap_or_else(|_| {
            errors.add(
                "strategy",
                format!("\"{s}\" is not a valid choice. Choose one of: {}.", Strategy::choices()),
            );
            default_strategy
        }),
        Some(_) => {
            errors.add("strategy", "Not a valid choice.");
            default_strategy
        }
    };

    let raw_tasks: &[Value] = match obj.get("tasks") {
        None | Some(Value::Null) => {
            errors.add("tasks", "This field is required.");
            &[]
        }
        Some(Value::Array(items)) if items.is_empty() => {
            errors.add("tasks", "Provide at least one task.");
            &[]
        }
        Some(Value::Array(items)) => items,
        Some(_) => {
            errors.add("tasks", "Expected a list of items.");
            &[]
        }
    };

    let known = 1..=raw_tasks.len() as i64;
    let mut tasks = Vec::with_capacity(raw_tasks.len());
    for (i, raw) in raw_tasks.iter().enumerate() {
        let position = i as i64 + 1;
        let path = format!("tasks[{i}]");
        let Some(task) = raw.as_object() else {
            errors.add(path, "Invalid data. Expected a dictionary.");
            continue;
        };
        let cleaned = clean_task(task, position, &path, &mut errors);

        let deps: Vec<i64> = cleaned["dependencies"]
            .as_array()
            .map(|a| a.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default();
        for dep in deps {
            if !known.contains(&dep) {
                errors.add(
                    format!("{path}.dependencies"),
                    format!("Task {position} references unknown id {dep}."),
                );
            } else if dep == position {
                errors.add(
                    format!("{path}.dependencies"),
                    format!("Task {position} cannot depend on itself."),
                );
            }
        }
        tasks.push(cleaned);
    }

    if errors.is_empty() {
        Ok(ValidatedRequest { strategy, tasks })
    } else {
        Err(errors)
    }
}

/// Coerce one task, recording problems. Client ids are replaced by position.
fn clean_task(
    task: &Map<String, Value>,
    position: i64,
    path: &str,
    errors: &mut ValidationErrors,
) -> Value {
    let title = match task.get("title") {
        None | Some(Value::Null) => {
            errors.add(format!("{path}.title"), "This field is required.");
            String::new()
        }
        Some(Value::String(s)) => {
            let cleaned = s.trim().to_string();
            if cleaned.is_empty() {
                errors.add(format!("{path}.title"), "Title is required.");
            }
            cleaned
        }
        Some(_) => {
            errors.add(format!("{path}.title"), "Not a valid string.");
            String::new()
        }
    };

    let due_date = match task.get("due_date") {
        None | Some(Value::Null) => Value::Null,
        Some(Value::String(s)) if s.trim().is_empty() => Value::Null,
        Some(Value::String(s)) => match NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
            Ok(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            Err(_) => {
                errors.add(format!("{path}.due_date"), "Date has wrong format. Use YYYY-MM-DD.");
                Value::Null
            }
        },
        Some(_) => {
            errors.add(format!("{path}.due_date"), "Date has wrong format. Use YYYY-MM-DD.");
            Value::Null
        }
    };

    let estimated_hours = match task.get("estimated_hours") {
        None | Some(Value::Null) => DEFAULT_HOURS,
        Some(v) => match number(v) {
            Some(h) if h >= MIN_HOURS => h,
            Some(_) => {
                errors.add(
                    format!("{path}.estimated_hours"),
                    format!("Ensure this value is greater than or equal to {MIN_HOURS}."),
                );
                DEFAULT_HOURS
            }
            None => {
                errors.add(format!("{path}.estimated_hours"), "A valid number is required.");
                DEFAULT_HOURS
            }
        },
    };

    let importance = match task.get("importance") {
        None | Some(Value::Null) => DEFAULT_IMPORTANCE,
        Some(v) => match integer(v) {
            Some(n) if (1..=10).contains(&n) => n,
            Some(_) => {
                errors.add(format!("{path}.importance"), "Ensure this value is between 1 and 10.");
                DEFAULT_IMPORTANCE
            }
            None => {
                errors.add(format!("{path}.importance"), "A valid integer is required.");
                DEFAULT_IMPORTANCE
            }
        },
    };

    let dependencies: Vec<i64> = match task.get("dependencies") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| match integer(v) {
                Some(n) if n >= 1 => Some(n),
                Some(_) => {
                    errors.add(
                        format!("{path}.dependencies"),
                        "Ensure this value is greater than or equal to 1.",
                    );
                    None
                }
                None => {
                    errors.add(format!("{path}.dependencies"), "A valid integer is required.");
                    None
                }
            })
            .collect(),
        Some(_) => {
            errors.add(format!("{path}.dependencies"), "Expected a list of items.");
            Vec::new()
        }
    };

    json!({
        "id": position,
        "title": title,
        "due_date": due_date,
        "estimated_hours": estimated_hours,
        "importance": importance,
        "dependencies": dependencies
    })
}

fn number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

/// Integers, integral floats (`7.0`) and integer text (`"7"`).
fn integer(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
