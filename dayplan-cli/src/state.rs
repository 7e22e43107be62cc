use anyhow::{bail, Context, Result};
use dayplan_core::DaySnapshot;
use std::fs;
use std::path::{Path, PathBuf};

pub fn dayplan_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".dayplan"))
}

pub fn ensure_dayplan_home() -> Result<PathBuf> {
    let dir = dayplan_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn default_data_path() -> Result<PathBuf> {
    Ok(dayplan_home()?.join("day.json"))
}

pub fn read_snapshot(path: &Path) -> Result<DaySnapshot> {
    if !path.exists() {
        bail!(
            "No snapshot at {}. Pass --data <file> or set [data] file in config.toml",
            path.display()
        );
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

/// Load a snapshot for editing; a missing file starts empty.
pub fn read_snapshot_or_default(path: &Path) -> Result<DaySnapshot> {
    if !path.exists() {
        return Ok(DaySnapshot::default());
    }
    read_snapshot(path)
}

pub fn write_snapshot(path: &Path, snapshot: &DaySnapshot) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
