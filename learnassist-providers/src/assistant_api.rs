//! Request builders for the learning assistant's JSON API.

use crate::request::{Body, HttpRequest};
use learnassist_core::assistant::ContentItem;
use serde_json::{Value, json};

#[derive(Clone, PartialEq, Eq)]
pub struct AssistantApiConfig {
    pub base_url: String,
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for AssistantApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantApiConfig")
            .field("base_url", &self.base_url)
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

pub fn build_chat_request(cfg: &AssistantApiConfig, message: &str, history: &[String]) -> HttpRequest {
    post_json(cfg, "/chat", json!({ "message": message, "history": history }))
}

pub fn build_learning_style_request(cfg: &AssistantApiConfig, text: &str) -> HttpRequest {
    post_json(cfg, "/learning-style", json!({ "text": text }))
}

pub fn build_recommendations_request(
    cfg: &AssistantApiConfig,
    interests: &str,
    available_content: &[ContentItem],
) -> HttpRequest {
    post_json(
        cfg,
        "/recommendations",
        json!({ "interests": interests, "available_content": available_content }),
    )
}

pub fn build_summarize_request(cfg: &AssistantApiConfig, text: &str, max_length: u32) -> HttpRequest {
    post_json(cfg, "/summarize", json!({ "text": text, "max_length": max_length }))
}

pub fn build_question_request(cfg: &AssistantApiConfig, context: &str, question: &str) -> HttpRequest {
    post_json(cfg, "/qa", json!({ "context": context, "question": question }))
}

fn post_json(cfg: &AssistantApiConfig, path: &str, payload: Value) -> HttpRequest {
    let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
    if let Some(token) = cfg.bearer_token.as_deref().filter(|t| !t.trim().is_empty()) {
        headers.push(("Authorization".into(), format!("Bearer {}", token.trim())));
    }

    HttpRequest {
        method: "POST".into(),
        url: join_url(&cfg.base_url, path),
        headers,
        body: Body::Json(payload.to_string()),
    }
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
