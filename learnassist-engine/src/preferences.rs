//! Process-scoped accessibility preference store.
//!
//! Construct once at startup with [`PreferenceStore::init`] and hand the `Arc` to
//! every view that needs it. Writes go through [`PreferenceStore::set`], are
//! persisted immediately, and are announced to subscribers synchronously.

use std::collections::{HashMap, VecDeque};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use learnassist_core::error::PreferenceError;
use learnassist_core::preferences::{PreferenceAxis, PreferenceSet, PreferenceValue};

use crate::speech::SpeechChannel;
use crate::traits::PreferenceBackend;

/// Playback rate for all spoken output (slightly slower than normal).
pub const SPEECH_RATE: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreferenceChange {
    pub value: PreferenceValue,
    pub snapshot: PreferenceSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type PreferenceListener = Arc<dyn Fn(&PreferenceChange) + Send + Sync>;

struct Inner {
    prefs: PreferenceSet,
    listeners: Vec<(SubscriptionId, PreferenceListener)>,
    /// Pending changes per thread that is currently delivering notifications.
    /// A `set` from inside a listener lands in its own thread's queue.
    rounds: HashMap<ThreadId, VecDeque<PreferenceChange>>,
}

pub struct PreferenceStore {
    backend: Arc<dyn PreferenceBackend>,
    speech: Arc<SpeechChannel>,
    inner: Mutex<Inner>,
    next_subscription: AtomicU64,
}

impl PreferenceStore {
    /// Loads every axis independently; a missing or unreadable entry only resets
    /// its own axis to the default.
    pub fn init(backend: Arc<dyn PreferenceBackend>, speech: Arc<SpeechChannel>) -> Self {
        let mut prefs = PreferenceSet::default();

        for axis in PreferenceAxis::ALL {
            match backend.read(axis.storage_key()) {
                Ok(Some(raw)) => match axis.parse_value(&raw) {
                    Ok(value) => prefs.apply(value),
                    Err(e) => log::warn!("preferences: ignoring stored {axis}: {e}"),
                },
                Ok(None) => {}
                Err(e) => log::warn!("preferences: failed to read {axis}: {e:#}"),
            }
        }

        log::debug!("preferences loaded: {prefs:?}");

        Self {
            backend,
            speech,
            inner: Mutex::new(Inner {
                prefs,
                listeners: Vec::new(),
                rounds: HashMap::new(),
            }),
            next_subscription: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self) -> PreferenceSet {
        self.lock().prefs
    }

    /// Validates `raw` against the axis domain, then commits it.
    pub fn set(&self, axis: PreferenceAxis, raw: &str) -> Result<PreferenceSet, PreferenceError> {
        let value = axis.parse_value(raw)?;
        Ok(self.set_value(value))
    }

    pub fn set_value(&self, value: PreferenceValue) -> PreferenceSet {
        let axis = value.axis();
        let mut inner = self.lock();
        inner.prefs.apply(value);
        let snapshot = inner.prefs;

        // In-memory state stays authoritative if the write-through fails.
        if let Err(e) = self.backend.write(axis.storage_key(), &value.encode()) {
            log::warn!("preferences: failed to persist {axis}: {e:#}");
        }

        let change = PreferenceChange { value, snapshot };
        let me = thread::current().id();
        if let Some(queue) = inner.rounds.get_mut(&me) {
            // A listener is calling back into `set`; the outer loop delivers this.
            queue.push_back(change);
            return snapshot;
        }
        inner.rounds.insert(me, VecDeque::from([change]));
        drop(inner);

        let _round = Round { store: self, thread: me };
        loop {
            let (change, listeners) = {
                let mut inner = self.lock();
                let Some(change) = inner.rounds.get_mut(&me).and_then(VecDeque::pop_front) else {
                    break;
                };
                let listeners: Vec<PreferenceListener> =
                    inner.listeners.iter().map(|(_, l)| l.clone()).collect();
                (change, listeners)
            };
            for listener in &listeners {
                if catch_unwind(AssertUnwindSafe(|| listener(&change))).is_err() {
                    log::warn!(
                        "preferences: listener panicked on {}",
                        change.value.axis()
                    );
                }
            }
        }

        snapshot
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&PreferenceChange) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.lock().listeners.push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|(sid, _)| *sid != id);
        inner.listeners.len() != before
    }

    /// Speaks `text` when speech output is enabled; otherwise does nothing.
    pub async fn speak(&self, text: &str) {
        if !self.get().speech_enabled {
            return;
        }
        self.speech.speak(text, SPEECH_RATE).await;
    }

    /// Sets a value and speaks a confirmation such as "Font size changed to Large".
    pub async fn set_and_announce(
        &self,
        axis: PreferenceAxis,
        raw: &str,
    ) -> Result<PreferenceSet, PreferenceError> {
        let value = axis.parse_value(raw)?;
        let snapshot = self.set_value(value);
        self.speak(&format!("{} changed to {}", axis.label(), value.label()))
            .await;
        Ok(snapshot)
    }

    /// Drops all listeners and silences any utterance in flight.
    pub async fn dispose(&self) {
        self.lock().listeners.clear();
        self.speech.cancel().await;
    }
}

/// Ends a notification round for one thread, even if delivery unwinds.
struct Round<'a> {
    store: &'a PreferenceStore,
    thread: ThreadId,
}

impl Drop for Round<'_> {
    fn drop(&mut self) {
        self.store.lock().rounds.remove(&self.thread);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::tests::FakeSpeaker;
    use anyhow::anyhow;
    use learnassist_core::preferences::{Contrast, FontSize};
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapBackend {
        values: Mutex<HashMap<String, String>>,
        unreadable: Vec<&'static str>,
        read_only: bool,
    }

    impl MapBackend {
        fn with(entries: &[(&str, &str)]) -> Self {
            Self {
                values: Mutex::new(
                    entries
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                ),
                ..Default::default()
            }
        }
    }

    impl PreferenceBackend for MapBackend {
        fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
            if self.unreadable.contains(&key) {
                return Err(anyhow!("storage unavailable"));
            }
            Ok(self.values.lock().unwrap().get(key).cloned())
        }

        fn write(&self, key: &str, value: &str) -> anyhow::Result<()> {
            if self.read_only {
                return Err(anyhow!("quota exceeded"));
            }
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    fn store_with(backend: Arc<MapBackend>) -> (PreferenceStore, Arc<FakeSpeaker>) {
        let speaker = Arc::new(FakeSpeaker::default());
        let speech = Arc::new(SpeechChannel::new(speaker.clone()));
        (PreferenceStore::init(backend, speech), speaker)
    }

    #[test]
    fn empty_storage_yields_defaults() {
        let (store, _) = store_with(Arc::new(MapBackend::default()));
        assert_eq!(store.get(), PreferenceSet::default());
    }

    #[test]
    fn corrupt_axis_does_not_block_the_others() {
        let mut backend = MapBackend::with(&[
            ("fontSize", "gigantic"),
            ("contrast", "high"),
            ("darkMode", "true"),
            ("textToSpeech", "true"),
        ]);
        backend.unreadable = vec!["textToSpeech"];
        let (store, _) = store_with(Arc::new(backend));

        let p = store.get();
        assert_eq!(p.font_size, FontSize::Medium);
        assert_eq!(p.contrast, Contrast::High);
        assert!(p.dark_mode);
        assert!(!p.speech_enabled);
    }

    #[test]
    fn invalid_value_is_rejected_and_not_persisted() {
        let backend = Arc::new(MapBackend::default());
        let (store, _) = store_with(backend.clone());

        let err = store.set(PreferenceAxis::FontSize, "huge").unwrap_err();
        assert!(matches!(err, PreferenceError::InvalidValue { .. }));
        assert_eq!(store.get().font_size, FontSize::Medium);
        assert!(backend.values.lock().unwrap().is_empty());
    }

    #[test]
    fn valid_value_survives_a_reload() {
        let backend = Arc::new(MapBackend::default());
        let (store, _) = store_with(backend.clone());

        store.set(PreferenceAxis::FontSize, "large").unwrap();
        assert_eq!(store.get().font_size, FontSize::Large);
        assert_eq!(
            backend.values.lock().unwrap().get("fontSize").map(String::as_str),
            Some("large")
        );

        let (reloaded, _) = store_with(backend);
        assert_eq!(reloaded.get().font_size, FontSize::Large);
    }

    #[test]
    fn failed_write_keeps_in_memory_value() {
        let backend = Arc::new(MapBackend {
            read_only: true,
            ..Default::default()
        });
        let (store, _) = store_with(backend);

        store.set(PreferenceAxis::DarkMode, "true").unwrap();
        assert!(store.get().dark_mode);
    }

    #[test]
    fn subscribers_are_notified_synchronously() {
        let (store, _) = store_with(Arc::new(MapBackend::default()));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let id = store.subscribe({
            let seen = seen.clone();
            move |c: &PreferenceChange| seen.lock().unwrap().push(c.value)
        });

        store.set(PreferenceAxis::Contrast, "inverted").unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![PreferenceValue::Contrast(Contrast::Inverted)]
        );

        assert!(store.unsubscribe(id));
        store.set(PreferenceAxis::Contrast, "normal").unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn set_from_a_listener_is_queued_not_recursed() {
        let store = Arc::new(store_with(Arc::new(MapBackend::default())).0);
        let depth = Arc::new(Mutex::new((0usize, 0usize)));
        let order = Arc::new(Mutex::new(Vec::new()));

        // Dark mode forces high contrast.
        store.subscribe({
            let store = Arc::downgrade(&store);
            let depth = depth.clone();
            let order = order.clone();
            move |c: &PreferenceChange| {
                {
                    let mut d = depth.lock().unwrap();
                    d.0 += 1;
                    d.1 = d.1.max(d.0);
                }
                order.lock().unwrap().push(c.value);
                if c.value == PreferenceValue::DarkMode(true) {
                    if let Some(store) = store.upgrade() {
                        store.set(PreferenceAxis::Contrast, "high").unwrap();
                    }
                }
                depth.lock().unwrap().0 -= 1;
            }
        });

        store.set(PreferenceAxis::DarkMode, "true").unwrap();

        assert_eq!(depth.lock().unwrap().1, 1);
        assert_eq!(
            *order.lock().unwrap(),
            vec![
                PreferenceValue::DarkMode(true),
                PreferenceValue::Contrast(Contrast::High)
            ]
        );
        assert_eq!(store.get().contrast, Contrast::High);
    }

    #[test]
    fn panicking_listener_does_not_stop_delivery() {
        let (store, _) = store_with(Arc::new(MapBackend::default()));
        let hits = Arc::new(Mutex::new(0));

        let faulty = store.subscribe(|_: &PreferenceChange| panic!("listener bug"));
        store.subscribe({
            let hits = hits.clone();
            move |_: &PreferenceChange| *hits.lock().unwrap() += 1
        });

        store.set(PreferenceAxis::DarkMode, "true").unwrap();
        assert_eq!(*hits.lock().unwrap(), 1);

        assert!(store.unsubscribe(faulty));
        store.set(PreferenceAxis::FontSize, "large").unwrap();
        store.set(PreferenceAxis::Contrast, "high").unwrap();
        assert_eq!(*hits.lock().unwrap(), 3);
        assert!(store.lock().rounds.is_empty());
    }

    #[test]
    fn set_on_another_thread_is_delivered_before_it_returns() {
        let store = Arc::new(store_with(Arc::new(MapBackend::default())).0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let entered_tx = Mutex::new(entered_tx);
        let release_rx = Mutex::new(release_rx);

        // Holds the first round open until the main thread has finished its own set.
        store.subscribe({
            let seen = seen.clone();
            move |c: &PreferenceChange| {
                seen.lock().unwrap().push(c.value);
                if c.value == PreferenceValue::DarkMode(true) {
                    entered_tx.lock().unwrap().send(()).unwrap();
                    release_rx.lock().unwrap().recv().unwrap();
                }
            }
        });

        let slow = std::thread::spawn({
            let store = store.clone();
            move || store.set(PreferenceAxis::DarkMode, "true").unwrap()
        });
        entered_rx.recv().unwrap();

        store.set(PreferenceAxis::FontSize, "large").unwrap();
        assert!(
            seen.lock()
                .unwrap()
                .contains(&PreferenceValue::FontSize(FontSize::Large))
        );

        release_tx.send(()).unwrap();
        slow.join().unwrap();
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn speak_respects_the_toggle_and_rate() {
        let (store, speaker) = store_with(Arc::new(MapBackend::default()));

        store.speak("not audible").await;
        assert!(speaker.started.lock().unwrap().is_empty());

        store.set(PreferenceAxis::SpeechEnabled, "true").unwrap();
        store.speak("Welcome back").await;

        let started = speaker.started.lock().unwrap();
        assert_eq!(started.len(), 1);
        assert_eq!(started[0], ("Welcome back".to_string(), SPEECH_RATE));
    }

    #[tokio::test]
    async fn announce_speaks_a_confirmation() {
        let (store, speaker) = store_with(Arc::new(MapBackend::with(&[(
            "textToSpeech",
            "true",
        )])));

        store
            .set_and_announce(PreferenceAxis::FontSize, "extra-large")
            .await
            .unwrap();
        assert_eq!(
            speaker.audible.lock().unwrap().as_deref(),
            Some("Font size changed to Extra Large")
        );
    }

    #[tokio::test]
    async fn dispose_silences_and_detaches() {
        let (store, speaker) = store_with(Arc::new(MapBackend::with(&[(
            "textToSpeech",
            "true",
        )])));
        let hits = Arc::new(Mutex::new(0));
        store.subscribe({
            let hits = hits.clone();
            move |_: &PreferenceChange| *hits.lock().unwrap() += 1
        });

        store.speak("reading the lesson").await;
        store.dispose().await;

        assert!(speaker.audible.lock().unwrap().is_none());
        store.set(PreferenceAxis::DarkMode, "true").unwrap();
        assert_eq!(*hits.lock().unwrap(), 0);
    }
}
