use std::path::Path;
use std::sync::Arc;

use learnassist_core::config::AppConfig;
use learnassist_engine::preferences::PreferenceStore;
use learnassist_engine::session::{ConversationSession, SessionConfig};
use learnassist_engine::speech::SpeechChannel;
use learnassist_engine::traits::{LearningToolsGateway, SpeechBackend};

use crate::gateway::HttpAssistantGateway;
use crate::preference_file::FilePreferenceBackend;

/// Everything a front end needs, wired from one config.
pub struct LearnAssistRuntime {
    pub session: ConversationSession,
    pub preferences: Arc<PreferenceStore>,
    pub tools: Arc<dyn LearningToolsGateway>,
}

/// Build a runnable session from config + a platform speech backend.
///
/// Keeps front ends thin: they only choose where preferences live and how to speak.
pub fn build_session_from_config(
    cfg: &AppConfig,
    preferences_path: &Path,
    speech: Arc<dyn SpeechBackend>,
) -> LearnAssistRuntime {
    let gateway = Arc::new(HttpAssistantGateway::from_settings(&cfg.gateway));
    log::info!("assistant gateway: {}", cfg.gateway.base_url);

    let backend = Arc::new(FilePreferenceBackend::at_path(preferences_path));
    let preferences = Arc::new(PreferenceStore::init(
        backend,
        Arc::new(SpeechChannel::new(speech)),
    ));

    let session = ConversationSession::with_preferences(
        SessionConfig::from(cfg),
        gateway.clone(),
        preferences.clone(),
    );

    LearnAssistRuntime {
        session,
        preferences,
        tools: gateway,
    }
}
