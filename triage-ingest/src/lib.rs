//! triage-ingest: loading task batches from files into raw task dictionaries.

pub mod types;
pub mod parsers;

pub use types::{BatchFormat, TaskBatch};

use anyhow::{Context, Result};
use std::path::Path;

/// Load a batch from a `.json` or `.csv` file.
pub fn load_batch(path: impl AsRef<Path>) -> Result<TaskBatch> {
    let path = path.as_ref();
    let format = BatchFormat::from_path(path)?;
    match format {
        BatchFormat::Json => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            parsers::json_batch::parse_json_batch(&text)
                .with_context(|| format!("parsing {}", path.display()))
        }
        BatchFormat::Csv => parsers::csv_batch::parse_csv_batch_file(path),
    }
}
