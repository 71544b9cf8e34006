use std::time::Duration;

use learnassist_core::assistant::{Answer, ContentItem, Recommendation, Reply, StyleClassification};
use learnassist_core::config::GatewaySettings;
use learnassist_core::error::GatewayError;
use learnassist_engine::traits::{AssistantGateway, LearningToolsGateway};
use learnassist_providers::assistant_api::{self, AssistantApiConfig};
use learnassist_providers::parse;
use learnassist_providers::request::HttpRequest;
use learnassist_providers::runtime;

/// The assistant API over HTTP.
#[derive(Clone)]
pub struct HttpAssistantGateway {
    api: AssistantApiConfig,
    timeout: Duration,
}

impl std::fmt::Debug for HttpAssistantGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAssistantGateway")
            .field("api", &self.api)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpAssistantGateway {
    pub fn new(api: AssistantApiConfig, timeout: Duration) -> Self {
        Self { api, timeout }
    }

    pub fn from_settings(settings: &GatewaySettings) -> Self {
        Self::new(
            AssistantApiConfig {
                base_url: settings.base_url.clone(),
                bearer_token: settings.bearer_token.clone(),
            },
            Duration::from_millis(settings.call_timeout_ms.max(1)),
        )
    }

    async fn send(&self, req: HttpRequest) -> Result<Vec<u8>, GatewayError> {
        let resp = runtime::execute(&req, self.timeout)
            .await
            .map_err(|e| GatewayError::network(format!("{e:#}")))?;

        if !resp.is_success() {
            let message = parse::parse_error_message(&resp.body)
                .unwrap_or_else(|| format!("request to {} failed", req.url));
            return Err(GatewayError::server(Some(resp.status), message));
        }
        Ok(resp.body)
    }
}

fn undecodable(e: anyhow::Error) -> GatewayError {
    GatewayError::server(None, format!("{e:#}"))
}

#[async_trait::async_trait]
impl AssistantGateway for HttpAssistantGateway {
    async fn generate_reply(
        &self,
        message: &str,
        history: &[String],
    ) -> Result<Reply, GatewayError> {
        let req = assistant_api::build_chat_request(&self.api, message, history);
        let body = self.send(req).await?;
        let text = parse::parse_chat_reply(&body).map_err(undecodable)?;
        Ok(Reply { text })
    }

    async fn classify_style(&self, text: &str) -> Result<StyleClassification, GatewayError> {
        let req = assistant_api::build_learning_style_request(&self.api, text);
        let body = self.send(req).await?;
        parse::parse_learning_style(&body).map_err(undecodable)
    }
}

#[async_trait::async_trait]
impl LearningToolsGateway for HttpAssistantGateway {
    async fn get_recommendations(
        &self,
        interests: &str,
        available_content: &[ContentItem],
    ) -> Result<Vec<Recommendation>, GatewayError> {
        let req =
            assistant_api::build_recommendations_request(&self.api, interests, available_content);
        let body = self.send(req).await?;
        parse::parse_recommendations(&body).map_err(undecodable)
    }

    async fn summarize_content(
        &self,
        text: &str,
        max_length: u32,
    ) -> Result<String, GatewayError> {
        let req = assistant_api::build_summarize_request(&self.api, text, max_length);
        let body = self.send(req).await?;
        parse::parse_summary(&body).map_err(undecodable)
    }

    async fn answer_question(
        &self,
        context: &str,
        question: &str,
    ) -> Result<Answer, GatewayError> {
        let req = assistant_api::build_question_request(&self.api, context, question);
        let body = self.send(req).await?;
        parse::parse_answer(&body).map_err(undecodable)
    }
}
