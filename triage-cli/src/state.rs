use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Per-user directory holding `config.toml`: `$HOME/.triage`.
pub fn triage_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".triage"))
}

/// Like [`triage_home`], creating the directory first when it is missing.
pub fn ensure_triage_home() -> Result<PathBuf> {
    let dir = triage_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
