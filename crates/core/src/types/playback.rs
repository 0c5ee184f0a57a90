//! Playback speed selection

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Returned when a multiplier is not one of the supported speeds
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("Unsupported playback speed {0}, expected one of 0.5, 1.0, 1.5, 2.0")]
pub struct InvalidSpeed(pub f32);

/// Playback speed multiplier, restricted to the supported set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub enum PlaybackSpeed {
    Half,
    #[default]
    Normal,
    OneAndHalf,
    Double,
}

impl PlaybackSpeed {
    /// All supported speeds in ascending order
    pub const ALL: [PlaybackSpeed; 4] = [
        PlaybackSpeed::Half,
        PlaybackSpeed::Normal,
        PlaybackSpeed::OneAndHalf,
        PlaybackSpeed::Double,
    ];

    /// Returns the numeric multiplier
    pub fn value(self) -> f32 {
        match self {
            Self::Half => 0.5,
            Self::Normal => 1.0,
            Self::OneAndHalf => 1.5,
            Self::Double => 2.0,
        }
    }

    /// Checks if this is normal speed
    pub fn is_normal(self) -> bool {
        self == Self::Normal
    }

    /// Returns the next faster speed, wrapping around to the slowest
    pub fn next(self) -> Self {
        match self {
            Self::Half => Self::Normal,
            Self::Normal => Self::OneAndHalf,
            Self::OneAndHalf => Self::Double,
            Self::Double => Self::Half,
        }
    }
}

impl TryFrom<f32> for PlaybackSpeed {
    type Error = InvalidSpeed;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|speed| (speed.value() - value).abs() < f32::EPSILON)
            .ok_or(InvalidSpeed(value))
    }
}

impl From<PlaybackSpeed> for f32 {
    fn from(speed: PlaybackSpeed) -> Self {
        speed.value()
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.value())
    }
}
