//! JSON batches: either a bare array of tasks or an analyze request envelope
//! `{ "strategy": "...", "tasks": [...] }`.

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::types::TaskBatch;

pub fn parse_json_batch(text: &str) -> Result<TaskBatch> {
    let value: Value = serde_json::from_str(text).context("invalid JSON")?;
    match value {
        Value::Array(tasks) => Ok(TaskBatch {
            strategy: None,
            tasks,
        }),
        Value::Object(_) => serde_json::from_value(value).context("expected {\"tasks\": [...]}"),
        _ => bail!("expected a task array or an object with a \"tasks\" array"),
    }
}
