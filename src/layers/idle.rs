//! Idle motion: blinking plus low-amplitude facial noise.
//!
//! Both behaviors are stateful but side-effect free; the layer returns
//! target weights and never touches the registry itself.

use std::collections::HashMap;
use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::EngineConfig;
use crate::state::AvatarMode;

const BLINK_SHAPES: [&str; 2] = ["Eye_Blink_L", "Eye_Blink_R"];

/// One micro-noise sinusoid. Each shape gets its own frequency and phase so
/// the face never moves in lockstep.
struct NoiseChannel {
    shape: &'static str,
    frequency: f32,
    phase: f32,
    amplitude: f32,
}

const NOISE_CHANNELS: &[NoiseChannel] = &[
    NoiseChannel {
        shape: "Brow_Raise_L",
        frequency: 0.35,
        phase: 0.0,
        amplitude: 0.06,
    },
    NoiseChannel {
        shape: "Brow_Raise_R",
        frequency: 0.35,
        phase: 0.4,
        amplitude: 0.06,
    },
    NoiseChannel {
        shape: "Cheek_Raise_L",
        frequency: 0.23,
        phase: 1.7,
        amplitude: 0.04,
    },
    NoiseChannel {
        shape: "Cheek_Raise_R",
        frequency: 0.23,
        phase: 2.3,
        amplitude: 0.04,
    },
    NoiseChannel {
        shape: "Mouth_Close",
        frequency: 0.5,
        phase: 0.9,
        amplitude: 0.05,
    },
];

#[derive(Debug)]
enum BlinkPhase {
    /// Accumulating toward the next scheduled blink.
    Waiting { timer: f32 },
    /// Phase advances by `delta * blink_rate`; the envelope rises over the
    /// first half and falls over the second.
    Blinking { phase: f32 },
}

/// The idle layer's state machine.
pub struct IdleMotion {
    blink: BlinkPhase,
    next_blink_at: f32,
    rng: StdRng,
}

impl IdleMotion {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic blink scheduling, for tests and reproducible captures.
    pub fn with_seed(config: &EngineConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &EngineConfig, mut rng: StdRng) -> Self {
        let next_blink_at = Self::schedule(&mut rng, config);
        Self {
            blink: BlinkPhase::Waiting { timer: 0.0 },
            next_blink_at,
            rng,
        }
    }

    fn schedule(rng: &mut StdRng, config: &EngineConfig) -> f32 {
        rng.gen_range(config.blink_interval_min..config.blink_interval_max)
    }

    /// Advances both sub-behaviors by `delta` and returns this frame's
    /// target weights. Empty when idle motion is disabled.
    pub fn update(
        &mut self,
        delta: f32,
        elapsed: f64,
        mode: AvatarMode,
        config: &EngineConfig,
    ) -> HashMap<String, f32> {
        let mut targets = HashMap::new();
        if !config.idle_motion {
            return targets;
        }

        let blink = self.update_blink(delta, config);
        for shape in BLINK_SHAPES {
            targets.insert(shape.to_string(), blink);
        }

        // Micro-noise yields to lip sync while speaking.
        let noise_scale = if mode == AvatarMode::Speaking {
            config.noise_speaking_scale
        } else {
            1.0
        };
        for channel in NOISE_CHANNELS {
            let angle = elapsed * channel.frequency as f64 * TAU + channel.phase as f64;
            let value = (angle.sin() as f32 * channel.amplitude * noise_scale).max(0.0);
            *targets.entry(channel.shape.to_string()).or_insert(0.0) += value;
        }

        targets
    }

    fn update_blink(&mut self, delta: f32, config: &EngineConfig) -> f32 {
        match &mut self.blink {
            BlinkPhase::Waiting { timer } => {
                *timer += delta;
                if *timer >= self.next_blink_at {
                    self.blink = BlinkPhase::Blinking { phase: 0.0 };
                    self.next_blink_at = Self::schedule(&mut self.rng, config);
                }
                0.0
            }
            BlinkPhase::Blinking { phase } => {
                *phase += delta * config.blink_rate;
                let ramp = if *phase <= 0.5 {
                    *phase * 2.0
                } else if *phase <= 1.0 {
                    (1.0 - *phase) * 2.0
                } else {
                    self.blink = BlinkPhase::Waiting { timer: 0.0 };
                    return 0.0;
                };
                config.blink_easing.eval(ramp)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_frames(
        idle: &mut IdleMotion,
        config: &EngineConfig,
        frames: usize,
        delta: f32,
        mode: AvatarMode,
    ) -> Vec<HashMap<String, f32>> {
        let mut elapsed = 0.0f64;
        (0..frames)
            .map(|_| {
                elapsed += delta as f64;
                idle.update(delta, elapsed, mode, config)
            })
            .collect()
    }

    #[test]
    fn blink_eventually_fires_and_is_symmetric() {
        let config = EngineConfig::default();
        let mut idle = IdleMotion::with_seed(&config, 7);

        // Eight seconds of frames covers the whole [2, 6) scheduling window
        // plus a complete blink envelope.
        let frames = run_frames(&mut idle, &config, 8 * 60, 1.0 / 60.0, AvatarMode::Idle);

        let peak = frames
            .iter()
            .map(|t| t.get("Eye_Blink_L").copied().unwrap_or(0.0))
            .fold(0.0f32, f32::max);
        assert!(peak > 0.8, "blink never rose, peak {}", peak);

        for targets in &frames {
            let left = targets.get("Eye_Blink_L").copied().unwrap_or(0.0);
            let right = targets.get("Eye_Blink_R").copied().unwrap_or(0.0);
            assert_eq!(left, right, "both eyes must blink identically");
        }
    }

    #[test]
    fn blink_returns_to_waiting() {
        let config = EngineConfig::default();
        let mut idle = IdleMotion::with_seed(&config, 7);

        run_frames(&mut idle, &config, 10 * 60, 1.0 / 60.0, AvatarMode::Idle);
        // A blink lasts ~1/8 s; a short tail finishes one that may have
        // started on the last sampled frame, and the [2, 6) interval keeps
        // a fresh one from starting within the tail.
        run_frames(&mut idle, &config, 10, 1.0 / 60.0, AvatarMode::Idle);
        assert!(
            matches!(idle.blink, BlinkPhase::Waiting { .. }),
            "blink must have completed"
        );
    }

    #[test]
    fn seeded_blink_schedule_is_deterministic() {
        let config = EngineConfig::default();
        let mut a = IdleMotion::with_seed(&config, 42);
        let mut b = IdleMotion::with_seed(&config, 42);

        let frames_a = run_frames(&mut a, &config, 600, 1.0 / 60.0, AvatarMode::Idle);
        let frames_b = run_frames(&mut b, &config, 600, 1.0 / 60.0, AvatarMode::Idle);
        for (fa, fb) in frames_a.iter().zip(&frames_b) {
            assert_eq!(fa.get("Eye_Blink_L"), fb.get("Eye_Blink_L"));
        }
    }

    #[test]
    fn noise_is_nonnegative_and_attenuated_while_speaking() {
        let config = EngineConfig::default();
        let mut idle = IdleMotion::with_seed(&config, 1);

        // Sample a time where the brow sinusoid is near its positive peak.
        let elapsed = 1.0 / (0.35 * 4.0);
        let idle_targets = idle.update(0.0, elapsed as f64, AvatarMode::Idle, &config);
        let speaking_targets = idle.update(0.0, elapsed as f64, AvatarMode::Speaking, &config);

        for targets in [&idle_targets, &speaking_targets] {
            for (shape, value) in targets.iter() {
                assert!(*value >= 0.0, "{} went negative: {}", shape, value);
            }
        }

        let idle_brow = idle_targets["Brow_Raise_L"];
        let speaking_brow = speaking_targets["Brow_Raise_L"];
        assert!(idle_brow > 0.0);
        assert!(
            (speaking_brow - idle_brow * config.noise_speaking_scale).abs() < 1e-6,
            "speaking noise {} should be idle noise {} scaled by {}",
            speaking_brow,
            idle_brow,
            config.noise_speaking_scale
        );
    }

    #[test]
    fn disabled_idle_motion_outputs_nothing() {
        let config = EngineConfig {
            idle_motion: false,
            ..EngineConfig::default()
        };
        let mut idle = IdleMotion::with_seed(&config, 1);

        let frames = run_frames(&mut idle, &config, 600, 1.0 / 60.0, AvatarMode::Idle);
        assert!(frames.iter().all(HashMap::is_empty));
    }
}
