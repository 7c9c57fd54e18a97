use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchFormat {
    Json,
    Csv,
}

impl BatchFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(BatchFormat::Json),
            Some("csv") => Ok(BatchFormat::Csv),
            _ => bail!("unsupported batch file (expected .json or .csv): {}", path.display()),
        }
    }
}

/// A loaded batch: raw task dictionaries plus an optional strategy name.
///
/// Tasks stay loosely typed here; validation and parsing happen downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskBatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    pub tasks: Vec<Value>,
}

impl TaskBatch {
    /// The batch as an analyze request body.
    pub fn to_request(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
