//! Headless console client for the Fatou chat backend.
//!
//! Reads user messages from stdin (one per line), drives the coordinator,
//! and prints transcript updates to stdout. Tracing goes to stderr so
//! stdout stays a clean conversation view.
//!
//! There are no platform speech engines on a server, so this binary also
//! exercises the unsupported-capture and unavailable-synthesis fallbacks.

use fatou::backend::HttpChatBackend;
use fatou::capture::RecordingController;
use fatou::config::VoiceConfig;
use fatou::coordinator::{CoordinatorCommand, UiEvent, VoiceCoordinator};
use fatou::synthesis::PlaybackController;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Tracing to stderr only; stdout is the conversation.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::var_os("FATOU_CONFIG") {
        Some(path) => VoiceConfig::from_file(std::path::Path::new(&path))?,
        None => {
            let path = VoiceConfig::default_config_path();
            if path.is_file() {
                VoiceConfig::from_file(&path)?
            } else {
                VoiceConfig::default()
            }
        }
    };

    tracing::info!("fatou-console starting (backend: {})", config.backend.api_url);

    let backend = Arc::new(HttpChatBackend::new(&config.backend)?);
    let recording = RecordingController::unsupported();
    let playback = PlaybackController::unavailable(config.synthesis.clone());

    let coordinator = VoiceCoordinator::new(config, recording, playback, backend);
    let mut events = coordinator.subscribe();
    let cancel = coordinator.cancel_token();

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let coordinator_handle = tokio::spawn(coordinator.run(command_rx));

    // Printer task: renders transcript updates as they arrive.
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                UiEvent::MessageAdded(message) => {
                    let who = match message.role {
                        fatou::backend::ChatRole::User => "vous",
                        fatou::backend::ChatRole::Assistant => "fatou",
                    };
                    println!("{who}> {}", message.text);
                }
                UiEvent::Loading(true) => println!("..."),
                UiEvent::CaptureUnsupported => {
                    println!("(mode vocal indisponible sur cette plateforme)");
                }
                _ => {}
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_owned();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" {
            break;
        }
        command_tx.send(CoordinatorCommand::SendText(line))?;
    }

    cancel.cancel();
    coordinator_handle
        .await
        .map_err(|e| anyhow::anyhow!("coordinator task failed: {e}"))??;
    printer.abort();

    tracing::info!("fatou-console shut down cleanly");
    Ok(())
}
