use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use futures_util::FutureExt;
use learnassist_core::config::AppConfig;
use learnassist_core::conversation::{Applied, Conversation, TurnEvent};
use learnassist_core::error::{GatewayError, SessionError};
use learnassist_core::text::{clean_reply_text, preview};
use learnassist_core::types::{MessageEntry, SessionState, Turn, TurnId, TurnStatus};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};

use crate::badge::{StyleBadge, project_badge};
use crate::preferences::PreferenceStore;
use crate::traits::AssistantGateway;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub call_timeout: Duration,
    pub history_window: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(20),
            history_window: 6,
        }
    }
}

impl From<&AppConfig> for SessionConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            call_timeout: Duration::from_millis(cfg.gateway.call_timeout_ms.max(1)),
            history_window: cfg.session.history_window,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    TurnOpened {
        turn: TurnId,
        text: String,
    },
    TurnFinalized {
        turn: TurnId,
        status: TurnStatus,
        entry: MessageEntry,
    },
    StyleAcquired {
        turn: TurnId,
        style: String,
    },
}

struct Shared {
    cfg: SessionConfig,
    gateway: Arc<dyn AssistantGateway>,
    preferences: Option<Arc<PreferenceStore>>,
    // Runtime the session was built on, if any; turn tasks are spawned here.
    runtime: Option<Handle>,
    conversation: Mutex<Conversation>,
    state_tx: watch::Sender<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

/// The chat session: transcript owner and coordinator of per-turn remote calls.
///
/// Cloning is cheap and yields a handle to the same session. In-flight calls hold
/// their own handle, so results land even after every view has gone away.
#[derive(Clone)]
pub struct ConversationSession {
    shared: Arc<Shared>,
}

impl ConversationSession {
    pub fn new(cfg: SessionConfig, gateway: Arc<dyn AssistantGateway>) -> Self {
        Self::build(cfg, gateway, None)
    }

    /// Voices each assistant entry through the store when speech output is on.
    pub fn with_preferences(
        cfg: SessionConfig,
        gateway: Arc<dyn AssistantGateway>,
        preferences: Arc<PreferenceStore>,
    ) -> Self {
        Self::build(cfg, gateway, Some(preferences))
    }

    fn build(
        cfg: SessionConfig,
        gateway: Arc<dyn AssistantGateway>,
        preferences: Option<Arc<PreferenceStore>>,
    ) -> Self {
        let (state_tx, _) = watch::channel(SessionState::default());
        let (events, _) = broadcast::channel(64);

        Self {
            shared: Arc::new(Shared {
                cfg,
                gateway,
                preferences,
                runtime: Handle::try_current().ok(),
                conversation: Mutex::new(Conversation::new()),
                state_tx,
                events,
            }),
        }
    }

    /// Opens a turn and fires the reply and classification calls.
    ///
    /// Returns as soon as the user entry is in the transcript. Tasks run on the
    /// runtime the session was built on, else the caller's; with neither, nothing
    /// is opened and [`SessionError::NoRuntime`] is returned.
    pub fn submit(&self, user_text: &str) -> Result<TurnId, SessionError> {
        let runtime = self
            .shared
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
            .ok_or(SessionError::NoRuntime)?;

        let (turn, text, history) = {
            let mut conv = self.shared.lock();
            let turn = conv.open_turn(user_text, now_unix_ms())?;
            let text = conv
                .turn(turn)
                .map(|t| t.user_text.clone())
                .unwrap_or_default();
            let history = conv.history_before(turn, self.shared.cfg.history_window);
            self.shared.publish_state(&conv);
            (turn, text, history)
        };

        log::info!("turn {turn} opened: \"{}\"", preview(&text, 60));
        let _ = self.shared.events.send(SessionEvent::TurnOpened {
            turn,
            text: text.clone(),
        });

        runtime.spawn(run_reply(self.shared.clone(), turn, text.clone(), history));
        runtime.spawn(run_classification(self.shared.clone(), turn, text));

        Ok(turn)
    }

    pub fn state(&self) -> SessionState {
        self.shared.lock().state().clone()
    }

    pub fn transcript(&self) -> Vec<MessageEntry> {
        self.shared.lock().transcript().to_vec()
    }

    pub fn turns(&self) -> Vec<Turn> {
        self.shared.lock().turns().to_vec()
    }

    pub fn turn(&self, id: TurnId) -> Option<Turn> {
        self.shared.lock().turn(id).cloned()
    }

    pub fn badge(&self) -> Option<StyleBadge> {
        project_badge(&self.state())
    }

    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.shared.state_tx.subscribe()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    /// Resolves once no turn is pending.
    pub async fn wait_idle(&self) {
        let mut rx = self.watch_state();
        let _ = rx.wait_for(|s| !s.is_awaiting_response).await;
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Conversation> {
        self.conversation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_state(&self, conv: &Conversation) {
        self.state_tx.send_replace(conv.state().clone());
    }

    fn apply(&self, event: TurnEvent) -> Applied {
        let mut conv = self.lock();
        let applied = conv.apply(event);
        if applied != Applied::Unchanged {
            self.publish_state(&conv);
        }
        applied
    }
}

async fn run_reply(shared: Arc<Shared>, turn: TurnId, text: String, history: Vec<String>) {
    let gateway = shared.gateway.clone();
    let outcome = bounded(
        shared.cfg.call_timeout,
        "reply",
        gateway.generate_reply(&text, &history),
    )
    .await;

    let event = match outcome {
        Ok(reply) => {
            let cleaned = clean_reply_text(&reply.text);
            if cleaned.is_empty() {
                TurnEvent::ReplyFailed {
                    turn,
                    error: GatewayError::server(None, "empty reply"),
                }
            } else {
                TurnEvent::ReplyReady {
                    turn,
                    text: cleaned,
                }
            }
        }
        Err(error) => TurnEvent::ReplyFailed { turn, error },
    };

    if let TurnEvent::ReplyFailed { error, .. } = &event {
        log::warn!("turn {turn}: reply failed: {error}");
    }

    match shared.apply(event) {
        Applied::Finalized {
            turn,
            status,
            entry,
        } => {
            log::info!("turn {turn} {}", status.as_str());
            let _ = shared.events.send(SessionEvent::TurnFinalized {
                turn,
                status,
                entry: entry.clone(),
            });
            if let Some(prefs) = &shared.preferences {
                prefs.speak(entry.text()).await;
            }
        }
        _ => log::warn!("turn {turn}: reply arrived for a turn that is no longer pending"),
    }
}

async fn run_classification(shared: Arc<Shared>, turn: TurnId, text: String) {
    let gateway = shared.gateway.clone();
    let outcome = bounded(
        shared.cfg.call_timeout,
        "classification",
        gateway.classify_style(&text),
    )
    .await;

    let event = match outcome {
        Ok(c) => TurnEvent::StyleReady {
            turn,
            style: c.style,
        },
        Err(error) => {
            // Best-effort; never surfaced.
            log::warn!("turn {turn}: style classification failed: {error}");
            TurnEvent::StyleFailed { turn, error }
        }
    };

    if let Applied::StyleAcquired { turn, style } = shared.apply(event) {
        log::debug!("turn {turn} style: {style}");
        let _ = shared
            .events
            .send(SessionEvent::StyleAcquired { turn, style });
    }
}

/// Runs one gateway call with a deadline. Expiry and panics count as failures of
/// that call so every pending turn reaches a terminal state.
async fn bounded<T, F>(limit: Duration, what: &str, call: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    match tokio::time::timeout(limit, AssertUnwindSafe(call).catch_unwind()).await {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => Err(GatewayError::server(None, format!("{what} call panicked"))),
        Err(_) => Err(GatewayError::network(format!(
            "{what} call timed out after {}ms",
            limit.as_millis()
        ))),
    }
}

fn now_unix_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
