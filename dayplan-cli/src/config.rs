use anyhow::{Context, Result};
use dayplan_core::FocusMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_dayplan_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub planner: PlannerSection,
    #[serde(default)]
    pub data: DataSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSection {
    /// Minutes available for the planned block.
    pub available_minutes: i64,
    /// "HH:MM" the block starts at.
    pub start_time: String,
    pub break_minutes: i64,
    pub focus_mode: FocusMode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSection {
    /// Snapshot JSON; defaults to ~/.dayplan/day.json
    pub file: Option<String>,
}

impl Default for PlannerSection {
    fn default() -> Self {
        Self {
            available_minutes: 180,
            start_time: "19:00".to_string(),
            break_minutes: 5,
            focus_mode: FocusMode::Classic,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_dayplan_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
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
    let cfg = Config::default();
    save_config(&cfg)?;
    println!("Wrote {}", p.display());
    Ok(())
}
