use chapterplay_core::{format_time, ErrorAlert, PlaybackSpeed};
use std::path::PathBuf;

/// Where the summary retrieval stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryStatus {
    /// Still being fetched
    #[default]
    Pending,
    Loaded,
    /// Retrieval failed; nothing will play
    Unavailable,
}

/// Observable player state, republished after every handled event
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaybackSnapshot {
    pub current_index: usize,
    pub is_playing: bool,
    /// The user is scrubbing; programmatic seeks and progress updates pause
    pub is_editing: bool,
    pub current_progress: f64,
    /// Zero or non-finite until the transport knows the chapter length
    pub duration: f64,
    pub playback_speed: PlaybackSpeed,
    pub pending_error: Option<ErrorAlert>,
    pub chapter_motto: String,
    pub chapter_count: usize,
    pub summary: SummaryStatus,
    pub cover_path: Option<PathBuf>,
}

impl PlaybackSnapshot {
    pub(crate) fn new(playback_speed: PlaybackSpeed) -> Self {
        Self {
            playback_speed,
            ..Self::default()
        }
    }

    pub fn summary_loaded(&self) -> bool {
        self.summary == SummaryStatus::Loaded
    }

    /// Chapter position as shown to the user, e.g. "2/4"
    pub fn chapter_label(&self) -> String {
        match self.chapter_count {
            0 => "No chapters".to_string(),
            count => format!("{}/{}", self.current_index + 1, count),
        }
    }

    /// Progress and duration as "mm:ss / mm:ss"
    pub fn time_label(&self) -> String {
        format!(
            "{} / {}",
            format_time(self.current_progress),
            format_time(self.duration)
        )
    }

    /// Fraction of the chapter played, 0 when the duration is unknown
    pub fn fraction_played(&self) -> f64 {
        if self.duration.is_finite() && self.duration > 0.0 {
            (self.current_progress / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        let mut snapshot = PlaybackSnapshot::new(PlaybackSpeed::Normal);
        assert_eq!(snapshot.chapter_label(), "No chapters");

        snapshot.chapter_count = 4;
        snapshot.current_index = 1;
        snapshot.current_progress = 65.0;
        snapshot.duration = 180.0;
        assert_eq!(snapshot.chapter_label(), "2/4");
        assert_eq!(snapshot.time_label(), "01:05 / 03:00");
    }

    #[test]
    fn test_summary_starts_pending() {
        let snapshot = PlaybackSnapshot::new(PlaybackSpeed::Normal);
        assert_eq!(snapshot.summary, SummaryStatus::Pending);
        assert!(!snapshot.summary_loaded());
    }

    #[test]
    fn test_fraction_played() {
        let mut snapshot = PlaybackSnapshot::default();
        snapshot.current_progress = 30.0;
        assert_eq!(snapshot.fraction_played(), 0.0);

        snapshot.duration = f64::NAN;
        assert_eq!(snapshot.fraction_played(), 0.0);

        snapshot.duration = 60.0;
        assert_eq!(snapshot.fraction_played(), 0.5);

        snapshot.current_progress = 75.0;
        assert_eq!(snapshot.fraction_played(), 1.0);
    }
}
