use anyhow::Context;
use learnassist_core::config::AppConfig;
use std::path::{Path, PathBuf};

use crate::fs_util::write_atomic;

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> anyhow::Result<AppConfig> {
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("read config: {}", self.path.display()))?;
        let cfg: AppConfig = serde_json::from_slice(&bytes).context("decode config JSON")?;
        Ok(cfg)
    }

    /// Like [`ConfigStore::load`], but a missing file yields the defaults.
    pub fn load_or_default(&self) -> anyhow::Result<AppConfig> {
        if !self.path.exists() {
            log::info!(
                "no config at {}; using defaults",
                self.path.display()
            );
            return Ok(AppConfig::default());
        }
        self.load()
    }

    pub fn save(&self, cfg: &AppConfig) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(cfg).context("encode config JSON")?;
        write_atomic(&self.path, &json)
    }

    /// Where preferences live: the configured path, or `preferences.json` beside
    /// the config file.
    pub fn preferences_path(&self, cfg: &AppConfig) -> PathBuf {
        match cfg.preferences_path.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => PathBuf::from(p),
            _ => self.path.with_file_name("preferences.json"),
        }
    }
}
