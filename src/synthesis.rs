//! Speech synthesis engine contract and playback control.
//!
//! The platform synthesis engine is a singleton with single-utterance
//! semantics: speaking a new utterance supersedes whatever is active, so
//! the controller keeps no queue of its own. Status moves to `Speaking`
//! on the engine's start signal and back to `Idle` on its end signal;
//! `cancel_all` is the one transition applied synchronously.

use crate::config::SynthesisConfig;
use crate::error::Result;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A single utterance handed to the synthesis engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    /// Text to speak.
    pub text: String,
    /// Synthesis locale (BCP 47 tag).
    pub lang: String,
    /// Speaking rate multiplier.
    pub rate: f32,
    /// Voice pitch multiplier.
    pub pitch: f32,
}

/// Asynchronous start/end signals from the synthesis engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisEvent {
    /// Playback of the current utterance began.
    Started,
    /// Playback of the current utterance finished.
    Ended,
}

/// Command side of the platform synthesis engine.
pub trait SynthesisEngine: Send {
    /// Speak an utterance, superseding any active one.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be issued.
    fn speak(&mut self, request: SpeechRequest) -> Result<()>;

    /// Halt any in-progress or queued playback immediately.
    ///
    /// Must be safe to call when nothing is playing.
    fn cancel_all(&mut self);
}

/// Playback session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Nothing playing.
    Idle,
    /// An utterance is being spoken.
    Speaking,
}

/// Drives text-to-speech for assistant replies.
pub struct PlaybackController {
    engine: Option<Box<dyn SynthesisEngine>>,
    events: Option<mpsc::UnboundedReceiver<SynthesisEvent>>,
    profile: SynthesisConfig,
    status: PlaybackStatus,
}

impl PlaybackController {
    /// Create a controller over a platform synthesis engine.
    #[must_use]
    pub fn new(
        engine: Box<dyn SynthesisEngine>,
        events: mpsc::UnboundedReceiver<SynthesisEvent>,
        profile: SynthesisConfig,
    ) -> Self {
        Self {
            engine: Some(engine),
            events: Some(events),
            profile,
            status: PlaybackStatus::Idle,
        }
    }

    /// Controller for platforms without a synthesis engine.
    ///
    /// `speak` is silently skipped; voice mode remains otherwise
    /// functional with text-only replies.
    #[must_use]
    pub fn unavailable(profile: SynthesisConfig) -> Self {
        Self {
            engine: None,
            events: None,
            profile,
            status: PlaybackStatus::Idle,
        }
    }

    /// Take the engine event receiver so a run loop can poll it.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<SynthesisEvent>> {
        self.events.take()
    }

    /// Speak assistant text with the configured locale/rate/pitch profile.
    ///
    /// No-op on empty or whitespace-only text, and when no engine is
    /// available. The engine's single-utterance semantics cancel any
    /// previous playback.
    pub fn speak(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            debug!("synthesis engine unavailable, skipping playback");
            return;
        };
        let request = SpeechRequest {
            text: text.to_owned(),
            lang: self.profile.language.clone(),
            rate: self.profile.rate,
            pitch: self.profile.pitch,
        };
        if let Err(e) = engine.speak(request) {
            warn!("speech synthesis request failed: {e}");
        }
    }

    /// Halt playback and force status to `Idle` synchronously.
    ///
    /// Safe to call when already idle.
    pub fn cancel_all(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.cancel_all();
        }
        self.status = PlaybackStatus::Idle;
    }

    /// Apply one engine signal.
    pub fn handle_event(&mut self, event: SynthesisEvent) {
        match event {
            SynthesisEvent::Started => self.status = PlaybackStatus::Speaking,
            SynthesisEvent::Ended => self.status = PlaybackStatus::Idle,
        }
    }

    /// Current playback status.
    #[must_use]
    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    /// Whether an utterance is currently being spoken.
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.status == PlaybackStatus::Speaking
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        // Resource-release guarantee: the cancel request is never skipped.
        if let Some(engine) = self.engine.as_mut() {
            engine.cancel_all();
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct EngineLog {
        spoken: Vec<SpeechRequest>,
        cancels: usize,
    }

    struct ScriptedEngine {
        log: Arc<Mutex<EngineLog>>,
    }

    impl SynthesisEngine for ScriptedEngine {
        fn speak(&mut self, request: SpeechRequest) -> Result<()> {
            let mut log = self.log.lock().unwrap();
            // Single-utterance semantics: a new speak supersedes the old.
            log.spoken.push(request);
            Ok(())
        }

        fn cancel_all(&mut self) {
            self.log.lock().unwrap().cancels += 1;
        }
    }

    fn controller() -> (PlaybackController, Arc<Mutex<EngineLog>>) {
        let log = Arc::new(Mutex::new(EngineLog::default()));
        let engine = ScriptedEngine {
            log: Arc::clone(&log),
        };
        let (_tx, rx) = mpsc::unbounded_channel();
        (
            PlaybackController::new(Box::new(engine), rx, SynthesisConfig::default()),
            log,
        )
    }

    #[test]
    fn speak_applies_configured_profile() {
        let (mut ctl, log) = controller();
        ctl.speak("Bonjour !");
        let log = log.lock().unwrap();
        let request = &log.spoken[0];
        assert_eq!(request.text, "Bonjour !");
        assert_eq!(request.lang, "fr-FR");
        assert!((request.rate - 0.9).abs() < f32::EPSILON);
        assert!((request.pitch - 1.1).abs() < f32::EPSILON);
    }

    #[test]
    fn speak_skips_empty_text() {
        let (mut ctl, log) = controller();
        ctl.speak("");
        ctl.speak("   ");
        assert!(log.lock().unwrap().spoken.is_empty());
    }

    #[test]
    fn status_follows_engine_signals() {
        let (mut ctl, _log) = controller();
        assert_eq!(ctl.status(), PlaybackStatus::Idle);
        ctl.handle_event(SynthesisEvent::Started);
        assert_eq!(ctl.status(), PlaybackStatus::Speaking);
        ctl.handle_event(SynthesisEvent::Ended);
        assert_eq!(ctl.status(), PlaybackStatus::Idle);
    }

    #[test]
    fn second_speak_supersedes_first() {
        let (mut ctl, log) = controller();
        ctl.speak("premier");
        ctl.handle_event(SynthesisEvent::Started);
        ctl.speak("second");
        let log = log.lock().unwrap();
        // Both requests reached the engine; the engine keeps only the
        // latest active, which is all the controller relies on.
        assert_eq!(log.spoken.len(), 2);
        assert_eq!(log.spoken.last().unwrap().text, "second");
    }

    #[test]
    fn cancel_all_forces_idle_synchronously() {
        let (mut ctl, log) = controller();
        ctl.speak("quelque chose");
        ctl.handle_event(SynthesisEvent::Started);
        ctl.cancel_all();
        assert_eq!(ctl.status(), PlaybackStatus::Idle);
        assert_eq!(log.lock().unwrap().cancels, 1);
    }

    #[test]
    fn cancel_all_is_noop_when_idle() {
        let (mut ctl, log) = controller();
        ctl.cancel_all();
        assert_eq!(ctl.status(), PlaybackStatus::Idle);
        assert_eq!(log.lock().unwrap().cancels, 1);
    }

    #[test]
    fn unavailable_engine_skips_playback_silently() {
        let mut ctl = PlaybackController::unavailable(SynthesisConfig::default());
        ctl.speak("jamais prononcé");
        ctl.cancel_all();
        assert_eq!(ctl.status(), PlaybackStatus::Idle);
    }

    #[test]
    fn drop_cancels_active_playback() {
        let (mut ctl, log) = controller();
        ctl.speak("en cours");
        ctl.handle_event(SynthesisEvent::Started);
        drop(ctl);
        assert_eq!(log.lock().unwrap().cancels, 1);
    }
}
