//! User-facing playback alerts

use serde::{Deserialize, Serialize};

/// A dismissable alert describing a playback failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorAlert {
    pub title: String,
    pub message: String,
    pub dismiss_label: String,
}

impl ErrorAlert {
    pub const PLAYBACK_TITLE: &'static str = "Error during playback occurred";
    pub const DISMISS_LABEL: &'static str = "Got it!";

    /// Creates the alert shown when the audio backend reports a failure
    pub fn playback(message: impl Into<String>) -> Self {
        Self {
            title: Self::PLAYBACK_TITLE.to_string(),
            message: message.into(),
            dismiss_label: Self::DISMISS_LABEL.to_string(),
        }
    }
}
