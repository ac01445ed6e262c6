//! Playback timing configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing constants for autoplay, marker transitions, ring pulses and
/// globe rotation. All durations are in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Autoplay tick interval at speed 1x.
    pub tick_interval_ms: u64,
    /// Delay before a newly placed marker fades in.
    pub fade_in_delay_ms: u64,
    /// Delay between fading a marker out and removing it.
    pub fade_out_ms: u64,
    /// Length of one ring pulse.
    pub ring_duration_ms: u64,
    /// Virtual frame interval used for ring animation frames.
    pub frame_interval_ms: u64,
    /// Interval of the globe rotation timer.
    pub rotation_interval_ms: u64,
    /// Longitude step per rotation tick, in degrees.
    pub rotation_step_degrees: f64,
    /// Quiet period after user interaction before rotation resumes.
    pub interaction_grace_ms: u64,
    /// Highest selectable speed multiplier.
    pub max_speed: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 800,
            fade_in_delay_ms: 50,
            fade_out_ms: 500,
            ring_duration_ms: 1500,
            frame_interval_ms: 16,
            rotation_interval_ms: 40,
            rotation_step_degrees: 0.1,
            interaction_grace_ms: 1000,
            max_speed: 10,
        }
    }
}

/// A [`PlaybackConfig`] field holds an unusable value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid playback setting `{field}`: {reason}")]
pub struct PlaybackConfigError {
    /// Name of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub reason: &'static str,
}

impl PlaybackConfig {
    /// Checks that every interval is positive and the speed range is
    /// non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackConfigError`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), PlaybackConfigError> {
        let positive = [
            ("tick_interval_ms", self.tick_interval_ms),
            ("ring_duration_ms", self.ring_duration_ms),
            ("frame_interval_ms", self.frame_interval_ms),
            ("rotation_interval_ms", self.rotation_interval_ms),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(PlaybackConfigError {
                    field,
                    reason: "must be greater than zero",
                });
            }
        }
        if self.max_speed == 0 {
            return Err(PlaybackConfigError {
                field: "max_speed",
                reason: "must be at least 1",
            });
        }
        if !self.rotation_step_degrees.is_finite() {
            return Err(PlaybackConfigError {
                field: "rotation_step_degrees",
                reason: "must be a finite number",
            });
        }
        Ok(())
    }

    /// Autoplay interval at the given speed multiplier.
    #[must_use]
    pub fn tick_interval(&self, speed: u32) -> Duration {
        Duration::from_millis(self.tick_interval_ms) / speed.max(1)
    }

    /// Fade-in delay as a [`Duration`].
    #[must_use]
    pub const fn fade_in_delay(&self) -> Duration {
        Duration::from_millis(self.fade_in_delay_ms)
    }

    /// Fade-out removal delay as a [`Duration`].
    #[must_use]
    pub const fn fade_out(&self) -> Duration {
        Duration::from_millis(self.fade_out_ms)
    }

    /// Ring pulse length as a [`Duration`].
    #[must_use]
    pub const fn ring_duration(&self) -> Duration {
        Duration::from_millis(self.ring_duration_ms)
    }

    /// Frame interval as a [`Duration`].
    #[must_use]
    pub const fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Rotation timer interval as a [`Duration`].
    #[must_use]
    pub const fn rotation_interval(&self) -> Duration {
        Duration::from_millis(self.rotation_interval_ms)
    }

    /// Interaction grace period as a [`Duration`].
    #[must_use]
    pub const fn interaction_grace(&self) -> Duration {
        Duration::from_millis(self.interaction_grace_ms)
    }
}
