//! Configuration types for the voice coordinator.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration for the voice interaction system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Speech recognition (capture engine) settings.
    pub recognition: RecognitionConfig,
    /// Speech synthesis (playback) settings.
    pub synthesis: SynthesisConfig,
    /// Activity visualizer settings.
    pub visualizer: VisualizerConfig,
    /// Chat backend settings.
    pub backend: BackendConfig,
    /// Conversation transcript settings.
    pub history: HistoryConfig,
}

/// Speech recognition configuration.
///
/// These map directly onto the platform capture engine: a single fixed
/// locale, continuous capture, interim results enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Recognition locale (BCP 47 tag).
    pub language: String,
    /// Keep capturing across pauses instead of stopping at the first result.
    pub continuous: bool,
    /// Deliver interim (not-yet-final) results.
    pub interim_results: bool,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            language: "fr-FR".to_owned(),
            continuous: true,
            interim_results: true,
        }
    }
}

/// Speech synthesis configuration.
///
/// The rate/pitch profile is tuned for clarity: slightly slowed rate,
/// slightly raised pitch. Not user-adjustable at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Synthesis locale (BCP 47 tag).
    pub language: String,
    /// Speaking rate multiplier (1.0 = engine default).
    pub rate: f32,
    /// Voice pitch multiplier (1.0 = engine default).
    pub pitch: f32,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            language: "fr-FR".to_owned(),
            rate: 0.9,
            pitch: 1.1,
        }
    }
}

/// Activity visualizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Number of bars rendered per frame.
    pub bar_count: usize,
    /// Lower amplitude clamp while active.
    pub min_amplitude: f32,
    /// Upper amplitude clamp.
    pub max_amplitude: f32,
    /// Width of the uniform random delta applied to each bar per active tick.
    pub perturbation: f32,
    /// Multiplicative amplitude decay per inactive tick (< 1).
    pub decay: f32,
    /// Fraction of the drawing height bars may reach while active.
    pub active_scale: f32,
    /// Fraction of the drawing height bars rest at while inactive.
    pub idle_scale: f32,
    /// Oscillation angular rate in radians per millisecond.
    pub oscillation_rate: f32,
    /// Phase offset between adjacent bars in radians.
    pub phase_step: f32,
    /// Redraw interval in milliseconds.
    pub frame_interval_ms: u64,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            bar_count: 40,
            min_amplitude: 0.1,
            max_amplitude: 1.0,
            perturbation: 0.1,
            decay: 0.95,
            active_scale: 0.8,
            idle_scale: 0.1,
            oscillation_rate: 0.01,
            phase_step: 0.5,
            frame_interval_ms: 16,
        }
    }
}

/// Chat backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Chat endpoint URL.
    pub api_url: String,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:3000/api/chat".to_owned(),
            request_timeout_secs: 30,
        }
    }
}

/// Conversation transcript configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of messages retained for display and context.
    pub max_messages: usize,
    /// Assistant greeting seeded as the first transcript entry.
    pub greeting: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_messages: 200,
            greeting: "Bonjour ! Je suis Fatou AI, votre assistant intelligent. \
                       Comment puis-je vous aider aujourd'hui ?"
                .to_owned(),
        }
    }
}

impl VoiceConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::VoiceError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::VoiceError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/fatou/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("fatou").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("fatou")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/fatou-config/config.toml")
        }
    }
}
