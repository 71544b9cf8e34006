use anyhow::{Context, anyhow};
use learnassist_core::assistant::{Answer, Recommendation, StyleClassification};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(alias = "reply")]
    response: Option<String>,
}

/// Reads the assistant's reply. Servers answer with either `response` or `reply`.
pub fn parse_chat_reply(body: &[u8]) -> anyhow::Result<String> {
    let resp: ChatResponse = serde_json::from_slice(body).context("decode chat JSON")?;
    resp.response
        .ok_or_else(|| anyhow!("no reply in chat response"))
}

pub fn parse_learning_style(body: &[u8]) -> anyhow::Result<StyleClassification> {
    let c: StyleClassification =
        serde_json::from_slice(body).context("decode learning-style JSON")?;
    if c.style.trim().is_empty() {
        return Err(anyhow!("empty learning style"));
    }
    Ok(c)
}

#[derive(Debug, Deserialize)]
struct RecommendationsResponse {
    recommendations: Vec<Recommendation>,
}

pub fn parse_recommendations(body: &[u8]) -> anyhow::Result<Vec<Recommendation>> {
    let resp: RecommendationsResponse =
        serde_json::from_slice(body).context("decode recommendations JSON")?;
    Ok(resp.recommendations)
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    summary: String,
}

pub fn parse_summary(body: &[u8]) -> anyhow::Result<String> {
    let resp: SummaryResponse = serde_json::from_slice(body).context("decode summary JSON")?;
    Ok(resp.summary)
}

pub fn parse_answer(body: &[u8]) -> anyhow::Result<Answer> {
    serde_json::from_slice(body).context("decode answer JSON")
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
    details: Option<String>,
}

/// Best-effort message from a failed response body.
pub fn parse_error_message(body: &[u8]) -> Option<String> {
    if let Ok(resp) = serde_json::from_slice::<ErrorResponse>(body) {
        return match (resp.error, resp.details) {
            (Some(e), Some(d)) => Some(format!("{e}: {d}")),
            (Some(e), None) => Some(e),
            (None, Some(d)) => Some(d),
            (None, None) => None,
        };
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    (!text.is_empty()).then(|| text.chars().take(200).collect())
}
