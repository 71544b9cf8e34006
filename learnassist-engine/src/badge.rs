use learnassist_core::types::SessionState;
use serde::{Deserialize, Serialize};

/// The learning-style indicator shown next to the chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleBadge {
    style: String,
}

impl StyleBadge {
    pub fn style(&self) -> &str {
        &self.style
    }

    /// Title-cased for display, e.g. "reading/writing" -> "Reading/Writing".
    pub fn label(&self) -> String {
        let mut out = String::with_capacity(self.style.len());
        let mut boundary = true;
        for ch in self.style.chars() {
            if boundary {
                out.extend(ch.to_uppercase());
            } else {
                out.push(ch);
            }
            boundary = !ch.is_alphanumeric();
        }
        out
    }
}

/// Most recently acquired style, if any.
pub fn project_badge(state: &SessionState) -> Option<StyleBadge> {
    state
        .last_style
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| StyleBadge { style: s.to_string() })
}
