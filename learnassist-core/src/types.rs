use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Assistant entry recorded when a reply request fails.
pub const FALLBACK_REPLY: &str =
    "I'm having trouble connecting right now. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnId(pub Uuid);

impl TurnId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TurnId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnStatus {
    Pending,
    Answered,
    Failed,
}

impl TurnStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TurnStatus::Pending => "pending",
            TurnStatus::Answered => "answered",
            TurnStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, TurnStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub id: TurnId,
    pub user_text: String,
    pub status: TurnStatus,
    pub reply_text: Option<String>,
    pub style: Option<String>,
    pub created_at_unix_ms: i64,
}

impl Turn {
    pub fn pending(user_text: impl Into<String>, created_at_unix_ms: i64) -> Self {
        Self {
            id: TurnId::new(),
            user_text: user_text.into(),
            status: TurnStatus::Pending,
            reply_text: None,
            style: None,
            created_at_unix_ms,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TurnStatus::Pending
    }
}

/// One visible line of the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageEntry {
    User {
        turn: TurnId,
        text: String,
    },
    Agent {
        turn: TurnId,
        text: String,
        // Style known at the moment the reply landed; a later classification
        // only updates the turn and the badge.
        style: Option<String>,
    },
    AgentError {
        turn: TurnId,
        text: String,
    },
}

impl MessageEntry {
    pub fn turn(&self) -> TurnId {
        match self {
            MessageEntry::User { turn, .. }
            | MessageEntry::Agent { turn, .. }
            | MessageEntry::AgentError { turn, .. } => *turn,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            MessageEntry::User { text, .. }
            | MessageEntry::Agent { text, .. }
            | MessageEntry::AgentError { text, .. } => text,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, MessageEntry::User { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub is_awaiting_response: bool,
    pub last_style: Option<String>,
}
