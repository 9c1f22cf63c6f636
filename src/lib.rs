//! Fatou: voice-interaction coordinator for the Fatou AI chat assistant.
//!
//! This crate orchestrates a voice conversation client:
//! Speech capture → transcript assembly → chat backend → speech playback
//!
//! # Architecture
//!
//! Independent components connected by async channels:
//! - **Recording control**: state machine over a platform capture engine
//! - **Transcript assembly**: merges interim/final recognition segments
//! - **Chat backend**: HTTP request/response client for assistant replies
//! - **Playback control**: text-to-speech for replies in voice mode
//! - **Activity visualizer**: simulated bar display driven by session state
//!
//! The platform speech engines are injected behind the
//! [`capture::CaptureEngine`] and [`synthesis::SynthesisEngine`] traits;
//! this crate performs no audio buffering or signal processing of its own.

pub mod backend;
pub mod capture;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod history;
pub mod synthesis;
pub mod transcript;
pub mod visualizer;

pub use backend::{ChatBackend, ChatRole, ChatTurn, HttpChatBackend};
pub use capture::{CaptureEngine, CaptureEvent, RecordingController, RecordingStatus};
pub use config::VoiceConfig;
pub use coordinator::{CoordinatorCommand, UiEvent, VoiceCoordinator};
pub use error::{Result, VoiceError};
pub use history::{ChatMessage, ConversationHistory};
pub use synthesis::{PlaybackController, PlaybackStatus, SynthesisEngine, SynthesisEvent};
pub use transcript::{RecognitionResult, RecognitionSegment, TranscriptAccumulator, Utterance};
pub use visualizer::{ActivityVisualizer, VisualizerFrame};
