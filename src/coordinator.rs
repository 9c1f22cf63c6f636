//! Voice mode coordinator: wires capture, playback, the visualizer
//! activity flag and the message-send flow together.
//!
//! The coordinator owns the voice-mode toggle and is the only component
//! allowed to drive the controllers. All state transitions happen on
//! delivery of asynchronous events (engine acknowledgments, commands,
//! backend responses); nothing here blocks.

use crate::backend::ChatBackend;
use crate::capture::RecordingController;
use crate::config::VoiceConfig;
use crate::error::Result;
use crate::history::{ChatMessage, ConversationHistory};
use crate::synthesis::PlaybackController;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Assistant reply substituted in the transcript when the send flow fails.
pub const SEND_FAILURE_REPLY: &str = "Désolé, une erreur s'est produite. Veuillez réessayer.";

/// UI event channel capacity.
const UI_EVENT_CHANNEL_SIZE: usize = 64;

/// Commands accepted by the coordinator run loop.
#[derive(Debug, Clone)]
pub enum CoordinatorCommand {
    /// Send a typed message through the chat flow.
    SendText(String),
    /// Toggle the recording session (start if idle, stop if recording).
    ToggleRecording,
    /// Enable or disable voice mode.
    SetVoiceMode(bool),
    /// Stop the run loop.
    Shutdown,
}

/// Events emitted for the chat view.
///
/// Lightweight by design so emission never blocks the event loop.
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// A message was appended to the transcript.
    MessageAdded(ChatMessage),
    /// The live partial transcript changed.
    PendingTranscript(String),
    /// Recording state changed.
    Recording(bool),
    /// Speaking state changed.
    Speaking(bool),
    /// A backend request started or finished.
    Loading(bool),
    /// Voice mode was toggled.
    VoiceMode(bool),
    /// The activity visualizer should be shown or hidden.
    VisualizerVisible(bool),
    /// No capture engine on this platform; render the fallback notice.
    CaptureUnsupported,
}

/// Top-level voice interaction coordinator.
pub struct VoiceCoordinator {
    config: VoiceConfig,
    recording: RecordingController,
    playback: PlaybackController,
    history: ConversationHistory,
    backend: Arc<dyn ChatBackend>,
    cancel: CancellationToken,
    ui_tx: broadcast::Sender<UiEvent>,
    activity: Arc<AtomicBool>,
    voice_enabled: bool,
    loading: bool,
    // Last emitted values, so state events fire only on change.
    last_recording: bool,
    last_speaking: bool,
    last_visible: bool,
    last_pending: String,
}

impl VoiceCoordinator {
    /// Create a coordinator over the given controllers and backend.
    ///
    /// The transcript starts seeded with the configured greeting.
    #[must_use]
    pub fn new(
        config: VoiceConfig,
        recording: RecordingController,
        playback: PlaybackController,
        backend: Arc<dyn ChatBackend>,
    ) -> Self {
        let history =
            ConversationHistory::with_greeting(config.history.max_messages, &config.history.greeting);
        let (ui_tx, _) = broadcast::channel(UI_EVENT_CHANNEL_SIZE);
        Self {
            config,
            recording,
            playback,
            history,
            backend,
            cancel: CancellationToken::new(),
            ui_tx,
            activity: Arc::new(AtomicBool::new(false)),
            voice_enabled: false,
            loading: false,
            last_recording: false,
            last_speaking: false,
            last_visible: false,
            last_pending: String::new(),
        }
    }

    /// Subscribe to UI events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.ui_tx.subscribe()
    }

    /// Token that stops the run loop when cancelled.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Shared activity flag for the visualizer loop
    /// (`recording OR speaking`, maintained by the coordinator).
    #[must_use]
    pub fn activity_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.activity)
    }

    /// Configuration the coordinator was built with.
    #[must_use]
    pub fn config(&self) -> &VoiceConfig {
        &self.config
    }

    /// Whether voice mode is currently enabled.
    #[must_use]
    pub fn voice_enabled(&self) -> bool {
        self.voice_enabled
    }

    /// Whether a backend request is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Read-only view of the conversation transcript.
    #[must_use]
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Run the coordinator until cancelled or shut down.
    ///
    /// Consumes commands, capture-engine events and synthesis-engine
    /// events in arrival order. On exit, stop/cancel requests are issued
    /// to both engines regardless of how the loop ended.
    ///
    /// # Errors
    ///
    /// Currently infallible at runtime; the `Result` reserves room for
    /// setup failures surfaced by future engine adapters.
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<CoordinatorCommand>,
    ) -> Result<()> {
        info!("voice coordinator started");

        if !self.recording.is_supported() {
            self.emit(UiEvent::CaptureUnsupported);
        }

        let mut capture_rx = self.recording.take_events();
        let mut synthesis_rx = self.playback.take_events();
        let cancel = self.cancel.clone();

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,

                command = commands.recv() => {
                    match command {
                        Some(CoordinatorCommand::SendText(text)) => {
                            self.send_message(&text, false).await;
                        }
                        Some(CoordinatorCommand::ToggleRecording) => {
                            self.recording.toggle();
                        }
                        Some(CoordinatorCommand::SetVoiceMode(enabled)) => {
                            self.set_voice_mode(enabled);
                        }
                        Some(CoordinatorCommand::Shutdown) | None => break,
                    }
                }

                event = recv_or_pending(&mut capture_rx) => {
                    match event {
                        Some(event) => {
                            if let Some(utterance) = self.recording.handle_event(event) {
                                self.sync_pending_transcript();
                                self.send_message(&utterance.text, true).await;
                            } else {
                                self.sync_pending_transcript();
                            }
                        }
                        None => capture_rx = None,
                    }
                }

                event = recv_or_pending(&mut synthesis_rx) => {
                    match event {
                        Some(event) => self.playback.handle_event(event),
                        None => synthesis_rx = None,
                    }
                }
            }

            self.sync_activity();
        }

        // Release the engines on every exit path. The controllers' Drop
        // impls repeat the requests, so a panic between here and drop
        // still releases the microphone.
        self.playback.cancel_all();
        self.recording.stop();
        info!("voice coordinator stopped");
        Ok(())
    }

    /// Enable or disable voice mode.
    ///
    /// Disabling force-stops any active playback synchronously and stops
    /// the recording session.
    pub fn set_voice_mode(&mut self, enabled: bool) {
        if self.voice_enabled == enabled {
            return;
        }
        self.voice_enabled = enabled;
        info!("voice mode {}", if enabled { "enabled" } else { "disabled" });
        if !enabled {
            self.playback.cancel_all();
            self.recording.stop();
        }
        self.emit(UiEvent::VoiceMode(enabled));
        self.sync_activity();
    }

    /// Run one message through the send flow.
    ///
    /// The context sent to the backend is the transcript *before* this
    /// message, matching the endpoint's expectations. A failed send
    /// substitutes the apologetic assistant reply instead of surfacing
    /// an error.
    pub async fn send_message(&mut self, text: &str, from_voice: bool) {
        if text.trim().is_empty() {
            return;
        }

        let context = self.history.turns();
        let user_message = self.history.push_user(text, from_voice);
        self.emit(UiEvent::MessageAdded(user_message));
        self.set_loading(true);

        match self.backend.send(text, &context).await {
            Ok(reply) => {
                let message = self.history.push_assistant(&reply);
                self.emit(UiEvent::MessageAdded(message));
                if self.voice_enabled {
                    // Recognition pauses before the assistant speaks so the
                    // microphone never captures the reply.
                    self.recording.stop();
                    self.playback.speak(&reply);
                }
            }
            Err(e) => {
                warn!("message send failed: {e}");
                let message = self.history.push_assistant(SEND_FAILURE_REPLY);
                self.emit(UiEvent::MessageAdded(message));
            }
        }

        self.set_loading(false);
        self.sync_activity();
    }

    fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.emit(UiEvent::Loading(loading));
        }
    }

    fn sync_pending_transcript(&mut self) {
        let pending = self.recording.pending_transcript();
        if pending != self.last_pending {
            self.last_pending = pending.to_owned();
            self.emit(UiEvent::PendingTranscript(self.last_pending.clone()));
        }
    }

    /// Recompute the derived activity state and emit change events.
    fn sync_activity(&mut self) {
        let recording = self.recording.is_recording();
        let speaking = self.playback.is_speaking();
        let visible = self.voice_enabled && (recording || speaking);

        self.activity.store(recording || speaking, Ordering::Relaxed);

        if recording != self.last_recording {
            self.last_recording = recording;
            self.emit(UiEvent::Recording(recording));
        }
        if speaking != self.last_speaking {
            self.last_speaking = speaking;
            self.emit(UiEvent::Speaking(speaking));
        }
        if visible != self.last_visible {
            self.last_visible = visible;
            self.emit(UiEvent::VisualizerVisible(visible));
        }
    }

    fn emit(&self, event: UiEvent) {
        // No subscribers is fine (headless runs).
        let _ = self.ui_tx.send(event);
    }
}

/// Receive from an optional channel, or park forever once it is gone.
///
/// Keeps drained engine channels from busy-looping the `select!`.
async fn recv_or_pending<T>(rx: &mut Option<mpsc::UnboundedReceiver<T>>) -> Option<T> {
    match rx.as_mut() {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
