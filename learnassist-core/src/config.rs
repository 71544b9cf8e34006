use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    pub base_url: String,

    // Attached as `Authorization: Bearer ...` when present.
    pub bearer_token: Option<String>,

    // Per-call bound; expiry is treated as a network failure.
    pub call_timeout_ms: u64,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".into(),
            bearer_token: None,
            call_timeout_ms: 20_000,
        }
    }
}

impl std::fmt::Debug for GatewaySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaySettings")
            .field("base_url", &self.base_url)
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("call_timeout_ms", &self.call_timeout_ms)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    // Prior transcript messages sent along with each reply request.
    pub history_window: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self { history_window: 6 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    // Overrides the platform TTS executable (e.g. "espeak-ng", "say").
    pub command: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gateway: GatewaySettings,
    pub session: SessionSettings,
    pub speech: SpeechSettings,

    // Defaults to `preferences.json` next to the config file.
    pub preferences_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: AppConfig =
            serde_json::from_str(r#"{"gateway":{"base_url":"https://learn.example.com/api"}}"#)
                .unwrap();
        assert_eq!(cfg.gateway.base_url, "https://learn.example.com/api");
        assert_eq!(cfg.gateway.call_timeout_ms, 20_000);
        assert_eq!(cfg.session.history_window, 6);
        assert_eq!(cfg.speech.command, None);
    }

    #[test]
    fn debug_redacts_token() {
        let settings = GatewaySettings {
            bearer_token: Some("secret-token".into()),
            ..Default::default()
        };
        let s = format!("{settings:?}");
        assert!(!s.contains("secret-token"));
        assert!(s.contains("[REDACTED]"));
    }
}
