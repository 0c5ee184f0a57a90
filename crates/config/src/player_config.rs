//! Player configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use chapterplay_core::PlaybackSpeed;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Player preferences and behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Speed applied when playback starts (0.5, 1.0, 1.5 or 2.0)
    pub default_speed: f32,

    /// Progress sampling interval in milliseconds
    pub poll_interval_ms: u64,

    /// Remaining time at which a chapter counts as finished
    pub completion_threshold_secs: f64,

    /// Distance of a relative jump in seconds
    pub jump_secs: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_speed: 1.0,
            poll_interval_ms: 500,
            completion_threshold_secs: 0.1,
            jump_secs: 15,
        }
    }
}

impl PlayerConfig {
    /// The configured speed, or normal speed when the value is unsupported
    pub fn playback_speed(&self) -> PlaybackSpeed {
        PlaybackSpeed::try_from(self.default_speed).unwrap_or_else(|e| {
            log::warn!("{}, using {}", e, PlaybackSpeed::Normal);
            PlaybackSpeed::Normal
        })
    }

    /// This section, or the defaults when any value is invalid
    ///
    /// Loading only warns about invalid values, so callers that act on them
    /// go through here.
    pub fn validated(&self) -> PlayerConfig {
        match self.validate() {
            Ok(()) => self.clone(),
            Err(problems) => {
                for problem in &problems {
                    log::warn!("{}, using player defaults", problem);
                }
                PlayerConfig::default()
            }
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl ConfigSection for PlayerConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let speeds: Vec<f32> = PlaybackSpeed::ALL.iter().map(|s| s.value()).collect();

        Validator::collect_errors(vec![
            Validator::one_of(&self.default_speed, &speeds, "player.default_speed"),
            Validator::in_range(self.poll_interval_ms, 50, 5000, "player.poll_interval_ms"),
            Validator::in_range(
                self.completion_threshold_secs,
                0.0,
                5.0,
                "player.completion_threshold_secs",
            ),
            Validator::in_range(self.jump_secs, 1, 300, "player.jump_secs"),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.default_speed = other.default_speed;
        self.poll_interval_ms = other.poll_interval_ms;
        self.completion_threshold_secs = other.completion_threshold_secs;
        self.jump_secs = other.jump_secs;
    }

    fn section_name(&self) -> &'static str {
        "player"
    }
}
