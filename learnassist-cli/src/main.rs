mod commands;

use anyhow::Context;
use learnassist_core::assistant::DEFAULT_SUMMARY_MAX_LENGTH;
use learnassist_core::preferences::{PreferenceAxis, PreferenceSet};
use learnassist_engine::session::{ConversationSession, SessionEvent};
use learnassist_engine::traits::LearningToolsGateway;
use learnassist_platform::speech::platform_speech_backend;
use learnassist_runtime::config_store::ConfigStore;
use learnassist_runtime::defaults::{apply_env_overrides, default_config_path};
use learnassist_runtime::runtime_engine::{LearnAssistRuntime, build_session_from_config};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::commands::{Command, HELP, parse_line};

fn init_logging() {
    let verbose = std::env::var("LEARNASSIST_VERBOSE").is_ok_and(|v| v == "1");
    let filter = if verbose {
        EnvFilter::new("debug,hyper=info,reqwest=info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let store = ConfigStore::at_path(default_config_path());
    let mut cfg = store
        .load_or_default()
        .with_context(|| format!("load config: {}", store.path().display()))?;
    apply_env_overrides(&mut cfg);
    info!(config = %store.path().display(), gateway = ?cfg.gateway, "learnassist starting");

    let speech = platform_speech_backend(cfg.speech.command.as_deref());
    let rt = build_session_from_config(&cfg, &store.preferences_path(&cfg), speech);

    spawn_event_printer(rt.session.clone());
    print_preferences(&rt.preferences.get());
    println!("type a question, or :help");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("read stdin")? {
        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => break,
            Ok(Some(cmd)) => run(&rt, cmd).await,
            Err(msg) => println!("{msg}"),
        }
    }

    rt.session.wait_idle().await;
    rt.preferences.dispose().await;
    Ok(())
}

async fn run(rt: &LearnAssistRuntime, cmd: Command) {
    match cmd {
        Command::Chat(text) => {
            if let Err(e) = rt.session.submit(&text) {
                println!("{e}");
            }
        }
        Command::Set { axis, value } => {
            match rt.preferences.set_and_announce(axis, &value).await {
                Ok(prefs) => println!("{} -> {}", axis.label(), prefs.value(axis).label()),
                Err(e) => println!("{e}"),
            }
        }
        Command::ShowPreferences => print_preferences(&rt.preferences.get()),
        Command::Summarize(text) => {
            match rt
                .tools
                .summarize_content(&text, DEFAULT_SUMMARY_MAX_LENGTH)
                .await
            {
                Ok(summary) => println!("summary> {summary}"),
                Err(e) => println!("summary failed: {e}"),
            }
        }
        Command::Ask { context, question } => {
            match rt.tools.answer_question(&context, &question).await {
                Ok(a) => println!("answer> {} (confidence {:.2})", a.answer, a.confidence),
                Err(e) => println!("question failed: {e}"),
            }
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}

fn print_preferences(prefs: &PreferenceSet) {
    for axis in PreferenceAxis::ALL {
        println!("  {:<16} {}", axis.label(), prefs.value(axis).label());
    }
}

fn spawn_event_printer(session: ConversationSession) {
    let mut events = session.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SessionEvent::TurnOpened { .. }) => println!("..."),
                Ok(SessionEvent::TurnFinalized { entry, .. }) => {
                    let badge = session
                        .badge()
                        .map(|b| format!(" [{}]", b.label()))
                        .unwrap_or_default();
                    println!("assistant>{badge} {}", entry.text());
                }
                Ok(SessionEvent::StyleAcquired { style, .. }) => {
                    log::debug!("learning style: {style}");
                }
                Err(RecvError::Lagged(n)) => log::warn!("event printer skipped {n} events"),
                Err(RecvError::Closed) => break,
            }
        }
    });
}
