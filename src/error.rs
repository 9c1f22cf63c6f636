//! Error types for the voice coordinator.

/// Top-level error type for the voice interaction system.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    /// Speech capture engine error.
    #[error("capture error: {0}")]
    Capture(String),

    /// Speech synthesis / playback error.
    #[error("playback error: {0}")]
    Playback(String),

    /// Chat backend request error (network or non-success response).
    #[error("backend error: {0}")]
    Backend(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, VoiceError>;
