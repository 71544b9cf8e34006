use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use learnassist_core::text::preview;
use tokio::sync::Mutex as AsyncMutex;

use crate::traits::SpeechBackend;

/// Serializes access to the speech primitive so at most one utterance is audible.
///
/// Backend failures are logged and swallowed: voice output is an enhancement,
/// never a required path.
pub struct SpeechChannel {
    backend: Arc<dyn SpeechBackend>,
    // Held across stop+start so two speak calls can never interleave.
    active: AsyncMutex<Option<u64>>,
    next_utterance: AtomicU64,
}

impl SpeechChannel {
    pub fn new(backend: Arc<dyn SpeechBackend>) -> Self {
        Self {
            backend,
            active: AsyncMutex::new(None),
            next_utterance: AtomicU64::new(1),
        }
    }

    /// Cancels whatever is playing, then starts `text`. Blank text only cancels.
    pub async fn speak(&self, text: &str, rate: f32) {
        let text = text.trim();
        if text.is_empty() {
            self.cancel().await;
            return;
        }

        let mut active = self.active.lock().await;

        if let Some(prev) = active.take() {
            if let Err(e) = self.backend.stop().await {
                log::warn!("speech: stopping utterance #{prev} failed: {e:#}");
            }
        }

        let id = self.next_utterance.fetch_add(1, Ordering::Relaxed);
        match self.backend.start(text, rate).await {
            Ok(()) => {
                log::debug!("speech: utterance #{id} \"{}\"", preview(text, 60));
                *active = Some(id);
            }
            Err(e) => log::warn!("speech: starting utterance #{id} failed: {e:#}"),
        }
    }

    /// Stops playback. A no-op when idle.
    pub async fn cancel(&self) {
        let mut active = self.active.lock().await;
        let Some(id) = active.take() else {
            return;
        };

        if let Err(e) = self.backend.stop().await {
            log::warn!("speech: cancelling utterance #{id} failed: {e:#}");
        }
    }
}
