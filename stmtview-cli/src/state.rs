use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$STMTVIEW_HOME`, or `~/.stmtview`
pub fn stmtview_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("STMTVIEW_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".stmtview"))
}

pub fn ensure_stmtview_home() -> Result<PathBuf> {
    let dir = stmtview_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn log_path() -> Result<PathBuf> {
    let dir = ensure_stmtview_home()?.join("logs");
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir.join("stmtview.log"))
}
