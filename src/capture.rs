//! Speech capture engine contract and recording session control.
//!
//! The platform capture engine (browser speech recognition, OS dictation
//! service) is exclusive and singleton: one active recording session at a
//! time. The controller never assumes synchronous transitions — it issues
//! start/stop *requests* and moves state only when the engine acknowledges
//! them through its event stream.

use crate::error::Result;
use crate::transcript::{RecognitionResult, TranscriptAccumulator, Utterance};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Errors the capture engine can report mid-session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureErrorKind {
    /// Microphone permission denied or revoked.
    PermissionDenied,
    /// No speech detected before the engine's timeout.
    NoSpeech,
    /// Capture was aborted by the platform.
    Aborted,
    /// Audio device failure.
    AudioDevice,
    /// Engine-side network failure (cloud recognizers).
    Network,
    /// Anything else, verbatim from the engine.
    Other(String),
}

impl std::fmt::Display for CaptureErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "not-allowed"),
            Self::NoSpeech => write!(f, "no-speech"),
            Self::Aborted => write!(f, "aborted"),
            Self::AudioDevice => write!(f, "audio-capture"),
            Self::Network => write!(f, "network"),
            Self::Other(kind) => write!(f, "{kind}"),
        }
    }
}

/// Asynchronous acknowledgments and results from the capture engine.
///
/// Delivered in arrival order over an unbounded channel; the controller is
/// the single consumer.
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    /// The engine started capturing (start acknowledgment).
    Started,
    /// A batch of recognition segments.
    Result(RecognitionResult),
    /// Mid-session engine error.
    Error(CaptureErrorKind),
    /// The engine stopped capturing (stop acknowledgment or engine-signaled end).
    Ended,
}

/// Command side of the platform capture engine.
///
/// Implementations forward requests to the platform and emit
/// [`CaptureEvent`]s on the channel handed out at construction. Both
/// requests must be non-blocking; acknowledgment is always asynchronous.
pub trait CaptureEngine: Send {
    /// Ask the engine to begin continuous capture with interim results.
    ///
    /// # Errors
    ///
    /// Returns an error if the request itself cannot be issued. Engine
    /// errors after a successful request arrive as [`CaptureEvent::Error`].
    fn request_start(&mut self) -> Result<()>;

    /// Ask the engine to stop capturing and release the microphone.
    ///
    /// Must be safe to call in any state; completion is signaled by
    /// [`CaptureEvent::Ended`].
    fn request_stop(&mut self);
}

/// Recording session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingStatus {
    /// Not capturing.
    Idle,
    /// Capturing (engine acknowledged start).
    Recording,
    /// No capture engine on this platform; start/stop are permanent no-ops.
    Unsupported,
}

/// State machine wrapping start/stop of speech capture.
pub struct RecordingController {
    engine: Option<Box<dyn CaptureEngine>>,
    events: Option<mpsc::UnboundedReceiver<CaptureEvent>>,
    accumulator: TranscriptAccumulator,
    status: RecordingStatus,
}

impl RecordingController {
    /// Create a controller over a platform capture engine.
    ///
    /// `events` is the receiving side of the channel the engine emits
    /// acknowledgments on.
    #[must_use]
    pub fn new(
        engine: Box<dyn CaptureEngine>,
        events: mpsc::UnboundedReceiver<CaptureEvent>,
    ) -> Self {
        Self {
            engine: Some(engine),
            events: Some(events),
            accumulator: TranscriptAccumulator::new(),
            status: RecordingStatus::Idle,
        }
    }

    /// Controller for platforms without a capture engine.
    ///
    /// Callers should render a fallback notice instead of the recording
    /// control; `start`/`stop`/`toggle` are no-ops.
    #[must_use]
    pub fn unsupported() -> Self {
        Self {
            engine: None,
            events: None,
            accumulator: TranscriptAccumulator::new(),
            status: RecordingStatus::Unsupported,
        }
    }

    /// Take the engine event receiver so a run loop can poll it.
    ///
    /// Returns `None` on the second call or when unsupported.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<CaptureEvent>> {
        self.events.take()
    }

    /// Request the engine to begin capturing.
    ///
    /// No-op when already recording or unsupported. Clears the pending
    /// transcript; the transition to `Recording` happens only on
    /// [`CaptureEvent::Started`].
    pub fn start(&mut self) {
        if self.status != RecordingStatus::Idle {
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        self.accumulator.clear();
        if let Err(e) = engine.request_start() {
            warn!("capture start request failed: {e}");
        }
    }

    /// Request the engine to stop capturing.
    ///
    /// No-op unless recording; the transition to `Idle` happens on
    /// [`CaptureEvent::Ended`].
    pub fn stop(&mut self) {
        if self.status != RecordingStatus::Recording {
            return;
        }
        if let Some(engine) = self.engine.as_mut() {
            engine.request_stop();
        }
    }

    /// Stop if recording, start otherwise.
    pub fn toggle(&mut self) {
        if self.status == RecordingStatus::Recording {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Apply one engine event, returning a completed utterance if the
    /// event finalized one.
    pub fn handle_event(&mut self, event: CaptureEvent) -> Option<Utterance> {
        match event {
            CaptureEvent::Started => {
                debug!("capture engine started");
                self.status = RecordingStatus::Recording;
                None
            }
            CaptureEvent::Result(result) => self.accumulator.ingest(&result),
            CaptureEvent::Error(kind) => {
                // Recovered locally: log the kind and return to idle.
                warn!("speech recognition error: {kind}");
                self.status = RecordingStatus::Idle;
                None
            }
            CaptureEvent::Ended => {
                debug!("capture engine ended");
                self.status = RecordingStatus::Idle;
                self.accumulator.clear();
                None
            }
        }
    }

    /// Current session status.
    #[must_use]
    pub fn status(&self) -> RecordingStatus {
        self.status
    }

    /// Whether the engine has acknowledged an active capture session.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.status == RecordingStatus::Recording
    }

    /// Whether a capture engine is available at all.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.status != RecordingStatus::Unsupported
    }

    /// Live partial transcript for the currently open utterance.
    #[must_use]
    pub fn pending_transcript(&self) -> &str {
        self.accumulator.pending()
    }
}

impl Drop for RecordingController {
    fn drop(&mut self) {
        // Mandatory cleanup: always ask the engine to release the
        // microphone, whatever state we were in.
        if let Some(engine) = self.engine.as_mut() {
            engine.request_stop();
        }
    }
}
