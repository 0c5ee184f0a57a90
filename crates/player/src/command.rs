use chapterplay_core::{BookSummary, PlaybackSpeed};
use tokio::sync::oneshot;

use crate::state::PlaybackSnapshot;

/// Commands a front end can send to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    /// Load and play the chapter at this index; ignored when out of range
    PlayChapter(usize),
    PlayNext,
    /// Go one chapter back; on the first chapter, restart it
    PlayPrevious,
    Pause,
    Resume,
    /// Absolute seek in seconds; ignored while scrubbing
    SeekTo(f64),
    /// Relative jump in seconds
    JumpBy(f64),
    SetEditing(bool),
    SetSpeed(PlaybackSpeed),
    DismissError,
    /// Re-read the duration of the current chapter
    FetchDuration,
    /// Start the progress poller, replacing a running one
    StartPoller,
}

/// Everything the controller reacts to, in queue order
#[derive(Debug)]
pub(crate) enum Event {
    Command(PlayerCommand),
    SummaryLoaded(Option<BookSummary>),
    PollerTick,
    DurationFetched {
        generation: u64,
        duration: f64,
    },
    ProgressSampled {
        generation: u64,
        progress: f64,
        duration: f64,
    },
    TransportError(String),
    Query(oneshot::Sender<PlaybackSnapshot>),
    Shutdown,
}

impl From<PlayerCommand> for Event {
    fn from(command: PlayerCommand) -> Self {
        Event::Command(command)
    }
}
