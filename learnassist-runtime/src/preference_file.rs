use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::Context;
use learnassist_engine::traits::PreferenceBackend;

use crate::fs_util::write_atomic;

/// Preferences as one flat JSON object of string values, e.g.
/// `{"fontSize":"large","darkMode":"true"}`.
#[derive(Debug)]
pub struct FilePreferenceBackend {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePreferenceBackend {
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> anyhow::Result<BTreeMap<String, String>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("read preferences: {}", self.path.display())));
            }
        };

        match serde_json::from_slice::<BTreeMap<String, serde_json::Value>>(&bytes) {
            Ok(map) => Ok(map
                .into_iter()
                .filter_map(|(k, v)| match v {
                    serde_json::Value::String(s) => Some((k, s)),
                    serde_json::Value::Bool(b) => Some((k, b.to_string())),
                    _ => None,
                })
                .collect()),
            Err(e) => {
                log::warn!(
                    "preferences: {} is not valid JSON ({e}); treating as empty",
                    self.path.display()
                );
                Ok(BTreeMap::new())
            }
        }
    }
}

impl PreferenceBackend for FilePreferenceBackend {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn write(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut map = self.load()?;
        map.insert(key.to_string(), value.to_string());
        let json = serde_json::to_vec_pretty(&map).context("encode preferences JSON")?;
        write_atomic(&self.path, &json)
    }
}
