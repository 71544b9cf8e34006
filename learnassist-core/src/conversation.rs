//! Pure turn/transcript reducer.
//!
//! Every remote completion is fed in as a [`TurnEvent`]; the reducer decides what
//! it changes. Async orchestration lives in the engine crate.

use crate::error::{GatewayError, SessionError};
use crate::text::normalize_user_text;
use crate::types::{FALLBACK_REPLY, MessageEntry, SessionState, Turn, TurnId, TurnStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    ReplyReady { turn: TurnId, text: String },
    ReplyFailed { turn: TurnId, error: GatewayError },
    StyleReady { turn: TurnId, style: String },
    StyleFailed { turn: TurnId, error: GatewayError },
}

impl TurnEvent {
    pub fn turn(&self) -> TurnId {
        match self {
            TurnEvent::ReplyReady { turn, .. }
            | TurnEvent::ReplyFailed { turn, .. }
            | TurnEvent::StyleReady { turn, .. }
            | TurnEvent::StyleFailed { turn, .. } => *turn,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Finalized {
        turn: TurnId,
        status: TurnStatus,
        entry: MessageEntry,
    },
    StyleAcquired {
        turn: TurnId,
        style: String,
    },
    /// The event had no effect (unknown turn, duplicate completion, dropped
    /// classification).
    Unchanged,
}

#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
    transcript: Vec<MessageEntry>,
    state: SessionState,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a pending turn and echoes the user entry into the transcript.
    pub fn open_turn(&mut self, user_text: &str, now_unix_ms: i64) -> Result<TurnId, SessionError> {
        let text = normalize_user_text(user_text).ok_or(SessionError::EmptyInput)?;

        let turn = Turn::pending(text.clone(), now_unix_ms);
        let id = turn.id;
        self.turns.push(turn);
        self.transcript.push(MessageEntry::User { turn: id, text });
        self.rederive();
        Ok(id)
    }

    pub fn apply(&mut self, event: TurnEvent) -> Applied {
        let Some(idx) = self.turns.iter().position(|t| t.id == event.turn()) else {
            return Applied::Unchanged;
        };

        let applied = match event {
            TurnEvent::ReplyReady { turn, text } => {
                self.finalize(idx, turn, TurnStatus::Answered, text)
            }
            TurnEvent::ReplyFailed { turn, .. } => {
                self.finalize(idx, turn, TurnStatus::Failed, FALLBACK_REPLY.to_string())
            }
            TurnEvent::StyleReady { turn, style } => {
                let style = style.trim().to_string();
                let t = &mut self.turns[idx];
                if style.is_empty() || t.style.is_some() {
                    Applied::Unchanged
                } else {
                    t.style = Some(style.clone());
                    self.state.last_style = Some(style.clone());
                    Applied::StyleAcquired { turn, style }
                }
            }
            TurnEvent::StyleFailed { .. } => Applied::Unchanged,
        };

        self.rederive();
        applied
    }

    fn finalize(&mut self, idx: usize, turn: TurnId, status: TurnStatus, text: String) -> Applied {
        let t = &mut self.turns[idx];
        if !t.is_pending() {
            return Applied::Unchanged;
        }

        t.status = status;
        t.reply_text = Some(text.clone());

        let entry = match status {
            TurnStatus::Answered => MessageEntry::Agent {
                turn,
                text,
                style: t.style.clone(),
            },
            _ => MessageEntry::AgentError { turn, text },
        };
        self.transcript.push(entry.clone());

        Applied::Finalized {
            turn,
            status,
            entry,
        }
    }

    fn rederive(&mut self) {
        self.state.is_awaiting_response = self.turns.iter().any(Turn::is_pending);
    }

    /// Texts of the entries recorded before `turn`'s user entry, oldest first,
    /// limited to the last `window`. Fallback entries are not conversation content.
    pub fn history_before(&self, turn: TurnId, window: usize) -> Vec<String> {
        let end = self
            .transcript
            .iter()
            .position(|e| e.is_user() && e.turn() == turn)
            .unwrap_or(self.transcript.len());

        let prior: Vec<String> = self.transcript[..end]
            .iter()
            .filter(|e| !matches!(e, MessageEntry::AgentError { .. }))
            .map(|e| e.text().to_string())
            .collect();

        let start = prior.len().saturating_sub(window);
        prior[start..].to_vec()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn turn(&self, id: TurnId) -> Option<&Turn> {
        self.turns.iter().find(|t| t.id == id)
    }

    pub fn transcript(&self) -> &[MessageEntry] {
        &self.transcript
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }
}
