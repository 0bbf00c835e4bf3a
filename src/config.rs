use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::clock::DEFAULT_WARP_DAYS_PER_SEC;
use crate::raster::DEFAULT_ASPECT_RATIO;

pub const DEFAULT_REDRAW_INTERVAL_MS: u64 = 100;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub redraw_interval_ms: u64,
    pub aspect_ratio: f64,
    pub warp_days_per_sec: f64,
    pub enable_color: bool,
    pub systems_dir: PathBuf,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            redraw_interval_ms: DEFAULT_REDRAW_INTERVAL_MS,
            aspect_ratio: DEFAULT_ASPECT_RATIO,
            warp_days_per_sec: DEFAULT_WARP_DAYS_PER_SEC,
            enable_color: true,
            systems_dir: PathBuf::from("systems"),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Redraw cadence, never faster than 10 ms.
    pub fn redraw_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.redraw_interval_ms.max(10))
    }
}

pub struct Paths {
    pub settings_path: PathBuf,
    pub log_path: PathBuf,
}

pub fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("net", "solterm", "Solterm").context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir).ok();
    Ok(Paths {
        settings_path: dir.join("settings.json"),
        log_path: dir.join("solterm.log"),
    })
}

/// Falls back to defaults on any read or parse failure.
pub fn load_settings(path: &Path) -> Settings {
    if let Ok(s) = fs::read_to_string(path) {
        if let Ok(v) = serde_json::from_str::<Settings>(&s) {
            return v;
        }
    }
    Settings::default()
}

pub fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data).with_context(|| format!("write {}", tmp.display()))?;
    if path.exists() {
        let _ = fs::remove_file(path);
    }
    fs::rename(&tmp, path).with_context(|| format!("rename to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("solterm-config-{tag}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn save_then_load() {
        let dir = scratch("roundtrip");
        let path = dir.join("settings.json");
        let mut s = Settings::default();
        s.warp_days_per_sec = 3.5;
        s.enable_color = false;
        save_settings_atomic(&path, &s).unwrap();
        save_settings_atomic(&path, &s).unwrap();
        assert_eq!(load_settings(&path), s);
        assert!(!path.with_extension("json.tmp").exists());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn garbage_or_missing_falls_back() {
        let dir = scratch("garbage");
        let path = dir.join("settings.json");
        assert_eq!(load_settings(&path), Settings::default());
        fs::write(&path, "{{{").unwrap();
        assert_eq!(load_settings(&path), Settings::default());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let s: Settings = serde_json::from_str(r#"{"aspect_ratio": 2.2}"#).unwrap();
        assert_eq!(s.aspect_ratio, 2.2);
        assert_eq!(s.redraw_interval_ms, DEFAULT_REDRAW_INTERVAL_MS);
        assert_eq!(s.redraw_interval(), std::time::Duration::from_millis(100));
    }
}
