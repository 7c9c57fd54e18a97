use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use triage_core::Strategy;
use triage_core::time::{parse_timezone, today_in};

use crate::state::ensure_triage_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub scoring: ScoringSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringSection {
    /// Used when a request names no strategy.
    pub default_strategy: Strategy,
    /// IANA timezone deciding which calendar day "today" is.
    pub timezone: String,
    /// Default `limit` for suggestions.
    pub suggest_limit: i64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Default for ScoringSection {
    fn default() -> Self {
        Self {
            default_strategy: Strategy::SmartBalance,
            timezone: "UTC".to_string(),
            suggest_limit: 3,
        }
    }
}

impl ServerSection {
    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid server address {}:{}", self.host, self.port))
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl ScoringSection {
    pub fn tz(&self) -> Result<Tz> {
        parse_timezone(&self.timezone).ok_or_else(|| anyhow!("invalid timezone: {}", self.timezone))
    }

    /// Today's date in the configured timezone.
    pub fn today(&self) -> Result<NaiveDate> {
        Ok(today_in(self.tz()?))
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.server.addr()?;
        self.scoring.tz()?;
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_triage_home()?.join("config.toml"))
}

/// Load `path`, or the default config file when `None`. A missing file yields
/// the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    let cfg: Config = toml::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn save_config(cfg: &Config, path: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(path: Option<&Path>) -> Result<()> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}
