use async_trait::async_trait;
use learnassist_core::assistant::{
    Answer, ContentItem, Recommendation, Reply, StyleClassification,
};
use learnassist_core::error::GatewayError;

/// Remote assistant calls that feed the turn state machine.
#[async_trait]
pub trait AssistantGateway: Send + Sync {
    async fn generate_reply(&self, message: &str, history: &[String])
    -> Result<Reply, GatewayError>;

    async fn classify_style(&self, text: &str) -> Result<StyleClassification, GatewayError>;
}

/// Study helpers on the same remote boundary; not part of the turn state machine.
#[async_trait]
pub trait LearningToolsGateway: Send + Sync {
    async fn get_recommendations(
        &self,
        interests: &str,
        available_content: &[ContentItem],
    ) -> Result<Vec<Recommendation>, GatewayError>;

    async fn summarize_content(&self, text: &str, max_length: u32)
    -> Result<String, GatewayError>;

    async fn answer_question(&self, context: &str, question: &str)
    -> Result<Answer, GatewayError>;
}

/// The platform text-to-speech primitive.
///
/// Only [`crate::speech::SpeechChannel`] may call this; it owns the
/// one-utterance-at-a-time rule.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Begins playback and returns without waiting for it to finish.
    async fn start(&self, text: &str, rate: f32) -> anyhow::Result<()>;

    /// Stops playback immediately. Must be harmless when nothing is playing.
    async fn stop(&self) -> anyhow::Result<()>;
}

/// String key-value persistence for preferences. Absence of a key is not an error.
pub trait PreferenceBackend: Send + Sync {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> anyhow::Result<()>;
}
