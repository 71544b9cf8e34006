use std::process::Stdio;
use std::sync::Arc;

use anyhow::Context;
use learnassist_engine::traits::SpeechBackend;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

/// Words per minute at rate 1.0.
const BASE_WPM: f32 = 175.0;

/// Speaks by running a TTS executable (`say` on macOS, `espeak-ng` elsewhere).
///
/// One child at a time; `stop` kills it.
#[derive(Debug)]
pub struct CommandSpeechBackend {
    program: String,
    child: Mutex<Option<Child>>,
}

impl CommandSpeechBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            child: Mutex::new(None),
        }
    }

    /// The configured program, or the platform default.
    pub fn detect(program: Option<&str>) -> Self {
        match program.map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) => Self::new(p),
            None => Self::new(default_program()),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

pub fn default_program() -> &'static str {
    if cfg!(target_os = "macos") {
        "say"
    } else {
        "espeak-ng"
    }
}

fn words_per_minute(rate: f32) -> u32 {
    let rate = if rate.is_finite() && rate > 0.0 { rate } else { 1.0 };
    ((BASE_WPM * rate).round() as u32).clamp(80, 450)
}

fn speech_args(program: &str, text: &str, rate: f32) -> Vec<String> {
    let is_say = std::path::Path::new(program)
        .file_stem()
        .is_some_and(|s| s == "say");
    let flag = if is_say { "-r" } else { "-s" };

    // Keep the text from being read as an option.
    let text = if text.starts_with('-') {
        format!(" {text}")
    } else {
        text.to_string()
    };

    vec![flag.to_string(), words_per_minute(rate).to_string(), text]
}

#[async_trait::async_trait]
impl SpeechBackend for CommandSpeechBackend {
    async fn start(&self, text: &str, rate: f32) -> anyhow::Result<()> {
        let mut slot = self.child.lock().await;
        if let Some(mut prev) = slot.take() {
            let _ = prev.kill().await;
        }

        let child = Command::new(&self.program)
            .args(speech_args(&self.program, text, rate))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawn speech program: {}", self.program))?;

        *slot = Some(child);
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let Some(mut child) = self.child.lock().await.take() else {
            return Ok(());
        };

        if child
            .try_wait()
            .context("poll speech process")?
            .is_some()
        {
            return Ok(());
        }
        child.kill().await.context("kill speech process")
    }
}

/// Discards everything; used when no TTS program is available.
#[derive(Debug, Default)]
pub struct SilentSpeechBackend;

#[async_trait::async_trait]
impl SpeechBackend for SilentSpeechBackend {
    async fn start(&self, text: &str, _rate: f32) -> anyhow::Result<()> {
        log::debug!("speech disabled; dropping {} chars", text.chars().count());
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// The platform backend if its program can be found on `PATH`, else silence.
pub fn platform_speech_backend(program: Option<&str>) -> Arc<dyn SpeechBackend> {
    let backend = CommandSpeechBackend::detect(program);
    if program_on_path(backend.program()) {
        Arc::new(backend)
    } else {
        log::warn!(
            "speech program {:?} not found; voice output disabled",
            backend.program()
        );
        Arc::new(SilentSpeechBackend)
    }
}

fn program_on_path(program: &str) -> bool {
    let candidate = std::path::Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file();
    }

    std::env::var_os("PATH").is_some_and(|paths| {
        std::env::split_paths(&paths).any(|dir| {
            let full = dir.join(program);
            full.is_file() || full.with_extension("exe").is_file()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_maps_to_words_per_minute() {
        assert_eq!(words_per_minute(1.0), 175);
        assert_eq!(words_per_minute(0.8), 140);
        assert_eq!(words_per_minute(0.1), 80);
        assert_eq!(words_per_minute(f32::NAN), 175);
    }

    #[test]
    fn say_and_espeak_use_their_own_rate_flags() {
        assert_eq!(
            speech_args("say", "Hello", 1.0),
            vec!["-r", "175", "Hello"]
        );
        assert_eq!(
            speech_args("/usr/bin/espeak-ng", "Hello", 2.0),
            vec!["-s", "350", "Hello"]
        );
        assert_eq!(speech_args("espeak-ng", "-5 degrees", 1.0)[2], " -5 degrees");
    }

    #[test]
    fn detect_prefers_the_configured_program() {
        assert_eq!(CommandSpeechBackend::detect(Some("espeak")).program(), "espeak");
        assert_eq!(
            CommandSpeechBackend::detect(Some("  ")).program(),
            default_program()
        );
    }

    #[tokio::test]
    async fn missing_program_fails_to_start_and_stop_is_harmless() {
        let backend = CommandSpeechBackend::new("learnassist-no-such-tts-program");
        assert!(backend.start("hello", 1.0).await.is_err());
        backend.stop().await.unwrap();
    }

    #[test]
    fn unknown_program_falls_back_to_silence() {
        assert!(!program_on_path("learnassist-no-such-tts-program"));
    }
}
