//! Simulated audio-activity visualizer.
//!
//! Renders a bar-amplitude display driven by a boolean activity input
//! (recording OR speaking), not by real audio: amplitudes are randomly
//! perturbed within bounds while active and decay toward a resting
//! sliver while idle. This is a deliberate simulation, not spectrum
//! analysis.

use crate::config::VisualizerConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Three-stop bar gradient, top to bottom: cyan → violet → magenta.
pub const GRADIENT_STOPS: [&str; 3] = ["#06b6d4", "#8b5cf6", "#ec4899"];

/// One rendered frame: per-bar heights as fractions of the drawing height.
///
/// Frames are transient — each tick regenerates the whole sequence and
/// nothing is persisted. Renderers apply [`GRADIENT_STOPS`] per bar and a
/// glow effect only while `active`.
#[derive(Debug, Clone)]
pub struct VisualizerFrame {
    /// Bar heights left to right, each in `[0, 1]`.
    pub heights: Vec<f32>,
    /// Whether the session was active when this frame was generated.
    pub active: bool,
}

/// Bar-amplitude state advanced once per animation tick.
pub struct ActivityVisualizer {
    config: VisualizerConfig,
    amplitudes: Vec<f32>,
    rng: StdRng,
}

impl ActivityVisualizer {
    /// Create a visualizer with randomly seeded resting amplitudes.
    #[must_use]
    pub fn new(config: VisualizerConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a visualizer with a caller-supplied RNG (deterministic tests).
    #[must_use]
    pub fn with_rng(config: VisualizerConfig, mut rng: StdRng) -> Self {
        let amplitudes = (0..config.bar_count)
            .map(|_| rng.gen_range(0.0f32..0.5) + 0.1)
            .collect();
        Self {
            config,
            amplitudes,
            rng,
        }
    }

    /// Advance one tick and produce the frame to render.
    ///
    /// `elapsed` is wall-clock time since the loop started; it phases the
    /// oscillation so bars move as a wave rather than in lockstep.
    pub fn tick(&mut self, active: bool, elapsed: Duration) -> VisualizerFrame {
        let t_ms = elapsed.as_secs_f32() * 1000.0;
        let cfg = &self.config;
        let mut heights = Vec::with_capacity(self.amplitudes.len());

        for (index, amplitude) in self.amplitudes.iter_mut().enumerate() {
            if active {
                let phase = t_ms * cfg.oscillation_rate + index as f32 * cfg.phase_step;
                let oscillation = phase.sin() * 0.5 + 0.5;
                heights.push(*amplitude * cfg.active_scale * oscillation);

                // A zero or negative perturbation disables jitter; sampling
                // an empty range would panic.
                let half = cfg.perturbation / 2.0;
                if half > 0.0 {
                    *amplitude += self.rng.gen_range(-half..half);
                }
                *amplitude = amplitude.clamp(cfg.min_amplitude, cfg.max_amplitude);
            } else {
                heights.push(*amplitude * cfg.idle_scale);
                *amplitude *= cfg.decay;
            }
        }

        VisualizerFrame { heights, active }
    }

    /// Current bar amplitudes (test/diagnostic accessor).
    #[must_use]
    pub fn amplitudes(&self) -> &[f32] {
        &self.amplitudes
    }

    /// Run the redraw loop until cancelled.
    ///
    /// Ticks at the configured frame interval, reading `activity` each
    /// tick and sending frames on `frames`. Rendering never gates the
    /// loop: frames are dropped when the receiver lags. Cancellation is
    /// unconditional — the loop exits as soon as `cancel` fires, leaving
    /// no recurring work behind.
    pub async fn run(
        mut self,
        activity: Arc<AtomicBool>,
        frames: mpsc::Sender<VisualizerFrame>,
        cancel: CancellationToken,
    ) {
        let started = Instant::now();
        // Floored at 1 ms: a zero-period interval panics.
        let mut interval =
            tokio::time::interval(Duration::from_millis(self.config.frame_interval_ms.max(1)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = interval.tick() => {
                    let active = activity.load(Ordering::Relaxed);
                    let frame = self.tick(active, started.elapsed());
                    if frames.try_send(frame).is_err() {
                        // Receiver lagging or gone; dropping the frame is fine,
                        // a closed channel ends the loop below.
                        if frames.is_closed() {
                            break;
                        }
                    }
                }
            }
        }
        debug!("visualizer loop stopped");
    }
}
