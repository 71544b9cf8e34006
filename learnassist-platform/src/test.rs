use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use learnassist_engine::traits::{PreferenceBackend, SpeechBackend};

/// Remembers every utterance instead of playing it.
#[derive(Debug, Default)]
pub struct RecordingSpeechBackend {
    pub utterances: Mutex<Vec<(String, f32)>>,
    pub stops: Mutex<usize>,
}

impl RecordingSpeechBackend {
    pub fn texts(&self) -> Vec<String> {
        self.utterances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(t, _)| t.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl SpeechBackend for RecordingSpeechBackend {
    async fn start(&self, text: &str, rate: f32) -> anyhow::Result<()> {
        self.utterances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((text.to_string(), rate));
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        *self.stops.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}

/// Process-local preference storage.
#[derive(Debug, Default)]
pub struct MemoryPreferenceBackend {
    pub values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferenceBackend {
    pub fn with_values<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            values: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
        }
    }
}

impl PreferenceBackend for MemoryPreferenceBackend {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.values.lock().unwrap_or_else(PoisonError::into_inner).get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
