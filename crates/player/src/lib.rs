//! Playback controller for Chapterplay
//!
//! A single actor task owns the playback state. Front ends talk to it through
//! a [`PlayerHandle`] and observe it through a `watch` channel of
//! [`PlaybackSnapshot`]s.

mod command;
mod controller;
mod poller;
mod state;

pub use command::PlayerCommand;
pub use controller::{PlaybackController, PlayerError, PlayerHandle, PlayerOptions, PlayerResult};
pub use state::{PlaybackSnapshot, SummaryStatus};
