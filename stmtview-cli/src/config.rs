use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use stmtview_ingest::{DEFAULT_BASE_URL, HttpAnalysisService, Readiness};

use crate::state::ensure_stmtview_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSection,
    pub readiness: ReadinessSection,
    pub export: ExportSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessSection {
    pub mode: ReadinessMode,
    /// For mode = "poll"
    pub poll_interval_ms: u64,
    /// For mode = "poll"
    pub max_attempts: u32,
    /// For mode = "fixed-delay"
    pub delay_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReadinessMode {
    /// Fetch as soon as the upload is acknowledged
    #[default]
    UploadAck,
    /// Re-fetch until results are available
    Poll,
    /// Sleep a fixed delay, then fetch once
    FixedDelay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    pub directory: PathBuf,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 120,
        }
    }
}

impl Default for ReadinessSection {
    fn default() -> Self {
        Self {
            mode: ReadinessMode::UploadAck,
            poll_interval_ms: 500,
            max_attempts: 20,
            delay_ms: Readiness::LEGACY_DELAY.as_millis() as u64,
        }
    }
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

impl ReadinessSection {
    pub fn resolve(&self) -> Readiness {
        match self.mode {
            ReadinessMode::UploadAck => Readiness::UploadAck,
            ReadinessMode::Poll => Readiness::Poll {
                interval: Duration::from_millis(self.poll_interval_ms),
                max_attempts: self.max_attempts.max(1),
            },
            ReadinessMode::FixedDelay => Readiness::FixedDelay(Duration::from_millis(self.delay_ms)),
        }
    }
}

impl Config {
    /// Apply command-line overrides on top of the file.
    pub fn with_overrides(mut self, server: Option<String>, readiness: Option<ReadinessMode>) -> Self {
        if let Some(url) = server {
            self.server.base_url = url;
        }
        if let Some(mode) = readiness {
            self.readiness.mode = mode;
        }
        self
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness.resolve()
    }

    pub fn service(&self) -> Result<HttpAnalysisService> {
        HttpAnalysisService::new(
            self.server.base_url.clone(),
            Duration::from_secs(self.server.request_timeout_secs.max(1)),
        )
        .with_context(|| format!("build client for {}", self.server.base_url))
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_stmtview_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn parse_config(s: &str) -> Result<Config> {
    Ok(toml::from_str(s)?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config(cfg: &Config) -> Result<()> {
    println!("# {}", config_path()?.display());
    print!("{}", toml::to_string_pretty(cfg).context("serialize config")?);
    Ok(())
}
