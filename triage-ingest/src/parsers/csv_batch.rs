//! CSV batches.
//!
//! Expected header (column order free, `id` and `due_date` optional):
//! title,due_date,estimated_hours,importance,dependencies
//!
//! `dependencies` holds task positions separated by `;` or spaces, e.g. `1;3`.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;

use crate::types::TaskBatch;

pub fn parse_csv_batch_file(path: impl AsRef<Path>) -> Result<TaskBatch> {
    let file = std::fs::File::open(path.as_ref())
        .with_context(|| format!("opening {}", path.as_ref().display()))?;
    parse_csv_batch(file).with_context(|| format!("parsing {}", path.as_ref().display()))
}

pub fn parse_csv_batch(reader: impl Read) -> Result<TaskBatch> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.to_ascii_lowercase())
        .collect();
    if !headers.iter().any(|h| h == "title") {
        bail!("missing 'title' column");
    }

    let mut tasks = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        let mut obj = Map::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            if cell.is_empty() {
                continue;
            }
            let value = match header.as_str() {
                "title" | "due_date" => Value::String(cell.to_string()),
                "id" | "estimated_hours" | "importance" => number_or_text(cell),
                "dependencies" => Value::Array(
                    cell.split(|c: char| c == ';' || c.is_whitespace())
                        .filter(|s| !s.is_empty())
                        .map(number_or_text)
                        .collect(),
                ),
                // unknown columns are ignored
                _ => continue,
            };
            obj.insert(header.clone(), value);
        }
        tasks.push(Value::Object(obj));
    }

    Ok(TaskBatch {
        strategy: None,
        tasks,
    })
}

/// Numbers become JSON numbers; anything else stays text so the validator can
/// report it.
fn number_or_text(cell: &str) -> Value {
    if let Ok(i) = cell.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = cell.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(cell.to_string())
}
