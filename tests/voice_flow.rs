//! End-to-end voice interaction scenarios.
//!
//! Drives the coordinator run loop with scripted platform engines (acks
//! delivered over the same channels a real engine would use) and a mock
//! HTTP chat backend.

use fatou::backend::{ChatRole, HttpChatBackend};
use fatou::capture::{CaptureEngine, CaptureEvent, RecordingController};
use fatou::config::{BackendConfig, VoiceConfig};
use fatou::coordinator::{CoordinatorCommand, SEND_FAILURE_REPLY, UiEvent, VoiceCoordinator};
use fatou::synthesis::{PlaybackController, SpeechRequest, SynthesisEngine, SynthesisEvent};
use fatou::transcript::{RecognitionResult, RecognitionSegment};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Capture engine that acknowledges start/stop like a platform engine.
struct AckCaptureEngine {
    events: mpsc::UnboundedSender<CaptureEvent>,
}

impl CaptureEngine for AckCaptureEngine {
    fn request_start(&mut self) -> fatou::error::Result<()> {
        let _ = self.events.send(CaptureEvent::Started);
        Ok(())
    }

    fn request_stop(&mut self) {
        let _ = self.events.send(CaptureEvent::Ended);
    }
}

/// Synthesis engine that acknowledges speak requests with a start signal.
struct AckSynthesisEngine {
    events: mpsc::UnboundedSender<SynthesisEvent>,
    spoken: mpsc::UnboundedSender<String>,
}

impl SynthesisEngine for AckSynthesisEngine {
    fn speak(&mut self, request: SpeechRequest) -> fatou::error::Result<()> {
        let _ = self.spoken.send(request.text);
        let _ = self.events.send(SynthesisEvent::Started);
        Ok(())
    }

    fn cancel_all(&mut self) {}
}

struct Harness {
    commands: mpsc::UnboundedSender<CoordinatorCommand>,
    events: broadcast::Receiver<UiEvent>,
    capture_tx: mpsc::UnboundedSender<CaptureEvent>,
    synthesis_tx: mpsc::UnboundedSender<SynthesisEvent>,
    spoken_rx: mpsc::UnboundedReceiver<String>,
    handle: tokio::task::JoinHandle<fatou::error::Result<()>>,
}

fn start_coordinator(server_uri: &str) -> Harness {
    let mut config = VoiceConfig::default();
    config.backend = BackendConfig {
        api_url: format!("{server_uri}/api/chat"),
        request_timeout_secs: 5,
    };

    let (capture_tx, capture_rx) = mpsc::unbounded_channel();
    let (synthesis_tx, synthesis_rx) = mpsc::unbounded_channel();
    let (spoken_tx, spoken_rx) = mpsc::unbounded_channel();

    let recording = RecordingController::new(
        Box::new(AckCaptureEngine {
            events: capture_tx.clone(),
        }),
        capture_rx,
    );
    let playback = PlaybackController::new(
        Box::new(AckSynthesisEngine {
            events: synthesis_tx.clone(),
            spoken: spoken_tx,
        }),
        synthesis_rx,
        config.synthesis.clone(),
    );
    let backend = Arc::new(HttpChatBackend::new(&config.backend).expect("client builds"));

    let coordinator = VoiceCoordinator::new(config, recording, playback, backend);
    let events = coordinator.subscribe();
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(coordinator.run(command_rx));

    Harness {
        commands: command_tx,
        events,
        capture_tx,
        synthesis_tx,
        spoken_rx,
        handle,
    }
}

/// Wait until `pick` matches an event, failing after two seconds.
async fn wait_for<T>(
    events: &mut broadcast::Receiver<UiEvent>,
    pick: impl Fn(&UiEvent) -> Option<T>,
) -> T {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let event = events.recv().await.expect("event channel open");
            if let Some(value) = pick(&event) {
                return value;
            }
        }
    })
    .await
    .expect("expected event before timeout")
}

async fn mount_reply(server: &MockServer, reply: &str) {
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "message": reply })),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn spoken_utterance_round_trips_to_spoken_reply() {
    let server = MockServer::start().await;
    mount_reply(&server, "Très bien !").await;
    let mut h = start_coordinator(&server.uri());

    h.commands
        .send(CoordinatorCommand::SetVoiceMode(true))
        .unwrap();
    h.commands.send(CoordinatorCommand::ToggleRecording).unwrap();
    wait_for(&mut h.events, |e| match e {
        UiEvent::Recording(true) => Some(()),
        _ => None,
    })
    .await;

    // Interim result first: pending transcript visible, nothing sent.
    h.capture_tx
        .send(CaptureEvent::Result(RecognitionResult {
            segments: vec![RecognitionSegment::interim("bonjour")],
        }))
        .unwrap();
    let pending = wait_for(&mut h.events, |e| match e {
        UiEvent::PendingTranscript(text) => Some(text.clone()),
        _ => None,
    })
    .await;
    assert_eq!(pending, "bonjour");

    // Final result: utterance sent to the backend, tagged voice-originated.
    h.capture_tx
        .send(CaptureEvent::Result(RecognitionResult {
            segments: vec![RecognitionSegment::finalized("bonjour comment")],
        }))
        .unwrap();

    let user = wait_for(&mut h.events, |e| match e {
        UiEvent::MessageAdded(m) if m.role == ChatRole::User => Some(m.clone()),
        _ => None,
    })
    .await;
    assert_eq!(user.text, "bonjour comment");
    assert!(user.from_voice);

    let reply = wait_for(&mut h.events, |e| match e {
        UiEvent::MessageAdded(m) if m.role == ChatRole::Assistant => Some(m.clone()),
        _ => None,
    })
    .await;
    assert_eq!(reply.text, "Très bien !");

    // The reply reaches the synthesis engine, which acks with Started.
    let spoken = tokio::time::timeout(Duration::from_secs(2), h.spoken_rx.recv())
        .await
        .expect("spoken before timeout")
        .expect("channel open");
    assert_eq!(spoken, "Très bien !");

    wait_for(&mut h.events, |e| match e {
        UiEvent::Speaking(true) => Some(()),
        _ => None,
    })
    .await;

    // Engine end signal returns playback to idle.
    h.synthesis_tx.send(SynthesisEvent::Ended).unwrap();
    wait_for(&mut h.events, |e| match e {
        UiEvent::Speaking(false) => Some(()),
        _ => None,
    })
    .await;

    h.commands.send(CoordinatorCommand::Shutdown).unwrap();
    h.handle.await.expect("join").expect("clean shutdown");
}

#[tokio::test]
async fn visualizer_visible_only_during_voice_activity() {
    let server = MockServer::start().await;
    mount_reply(&server, "ok").await;
    let mut h = start_coordinator(&server.uri());

    h.commands
        .send(CoordinatorCommand::SetVoiceMode(true))
        .unwrap();
    h.commands.send(CoordinatorCommand::ToggleRecording).unwrap();

    let visible = wait_for(&mut h.events, |e| match e {
        UiEvent::VisualizerVisible(v) => Some(*v),
        _ => None,
    })
    .await;
    assert!(visible);

    // Stop recording: engine acks Ended, visualizer hides.
    h.commands.send(CoordinatorCommand::ToggleRecording).unwrap();
    let visible = wait_for(&mut h.events, |e| match e {
        UiEvent::VisualizerVisible(v) => Some(*v),
        _ => None,
    })
    .await;
    assert!(!visible);

    h.commands.send(CoordinatorCommand::Shutdown).unwrap();
    h.handle.await.expect("join").expect("clean shutdown");
}

#[tokio::test]
async fn backend_failure_yields_apologetic_reply_and_clears_loading() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let mut h = start_coordinator(&server.uri());

    h.commands
        .send(CoordinatorCommand::SendText("bonjour".to_owned()))
        .unwrap();

    let reply = wait_for(&mut h.events, |e| match e {
        UiEvent::MessageAdded(m) if m.role == ChatRole::Assistant => Some(m.text.clone()),
        _ => None,
    })
    .await;
    assert_eq!(reply, SEND_FAILURE_REPLY);

    wait_for(&mut h.events, |e| match e {
        UiEvent::Loading(false) => Some(()),
        _ => None,
    })
    .await;

    h.commands.send(CoordinatorCommand::Shutdown).unwrap();
    h.handle.await.expect("join").expect("clean shutdown");
}

#[tokio::test]
async fn disabling_voice_mode_while_speaking_goes_idle() {
    let server = MockServer::start().await;
    mount_reply(&server, "longue réponse").await;
    let mut h = start_coordinator(&server.uri());

    h.commands
        .send(CoordinatorCommand::SetVoiceMode(true))
        .unwrap();
    h.commands
        .send(CoordinatorCommand::SendText("parle-moi".to_owned()))
        .unwrap();

    wait_for(&mut h.events, |e| match e {
        UiEvent::Speaking(true) => Some(()),
        _ => None,
    })
    .await;

    h.commands
        .send(CoordinatorCommand::SetVoiceMode(false))
        .unwrap();
    wait_for(&mut h.events, |e| match e {
        UiEvent::Speaking(false) => Some(()),
        _ => None,
    })
    .await;

    h.commands.send(CoordinatorCommand::Shutdown).unwrap();
    h.handle.await.expect("join").expect("clean shutdown");
}
