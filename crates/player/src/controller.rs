//! The playback state machine
//!
//! [`PlaybackController`] runs as one tokio task that drains a single event
//! queue. Front-end commands, poller ticks, summary retrieval, duration
//! lookups and transport errors all arrive on that queue and are handled one
//! at a time, so the state has exactly one writer. Work that has to wait
//! (duration lookups, summary retrieval) runs in spawned tasks whose results
//! re-enter the queue tagged with the chapter generation they belong to.

use crate::command::{Event, PlayerCommand};
use crate::poller::{Poller, DEFAULT_POLL_INTERVAL};
use crate::state::{PlaybackSnapshot, SummaryStatus};
use chapterplay_content_sources::SummaryProvider;
use chapterplay_core::{BookSummary, ErrorAlert, PlaybackSpeed};
use media_engine::Transport;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

/// Errors returned to front ends
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PlayerError {
    #[error("Player has shut down")]
    Closed,
}

pub type PlayerResult<T> = Result<T, PlayerError>;

/// Tunables for a controller instance
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerOptions {
    /// Speed applied to the transport when the controller starts
    pub initial_speed: PlaybackSpeed,
    pub poll_interval: Duration,
    /// A chapter counts as finished once this little time remains
    pub completion_threshold: f64,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            initial_speed: PlaybackSpeed::Normal,
            poll_interval: DEFAULT_POLL_INTERVAL,
            completion_threshold: 0.1,
        }
    }
}

/// Command side of a running controller
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    events: UnboundedSender<Event>,
    state: watch::Receiver<PlaybackSnapshot>,
}

impl PlayerHandle {
    fn push(&self, event: Event) -> PlayerResult<()> {
        self.events.send(event).map_err(|_| PlayerError::Closed)
    }

    pub fn send(&self, command: PlayerCommand) -> PlayerResult<()> {
        self.push(command.into())
    }

    pub fn play_chapter(&self, index: usize) -> PlayerResult<()> {
        self.send(PlayerCommand::PlayChapter(index))
    }

    pub fn play_next(&self) -> PlayerResult<()> {
        self.send(PlayerCommand::PlayNext)
    }

    pub fn play_previous(&self) -> PlayerResult<()> {
        self.send(PlayerCommand::PlayPrevious)
    }

    pub fn pause(&self) -> PlayerResult<()> {
        self.send(PlayerCommand::Pause)
    }

    pub fn resume(&self) -> PlayerResult<()> {
        self.send(PlayerCommand::Resume)
    }

    /// Pauses when playing and resumes otherwise
    pub fn toggle_playback(&self) -> PlayerResult<()> {
        if self.state.borrow().is_playing {
            self.pause()
        } else {
            self.resume()
        }
    }

    pub fn seek_to(&self, seconds: f64) -> PlayerResult<()> {
        self.send(PlayerCommand::SeekTo(seconds))
    }

    pub fn jump_by(&self, seconds: f64) -> PlayerResult<()> {
        self.send(PlayerCommand::JumpBy(seconds))
    }

    pub fn set_editing(&self, editing: bool) -> PlayerResult<()> {
        self.send(PlayerCommand::SetEditing(editing))
    }

    pub fn set_speed(&self, speed: PlaybackSpeed) -> PlayerResult<()> {
        self.send(PlayerCommand::SetSpeed(speed))
    }

    pub fn dismiss_error(&self) -> PlayerResult<()> {
        self.send(PlayerCommand::DismissError)
    }

    /// Retrieves the summary in the background and hands it to the controller
    ///
    /// A failed retrieval is logged and treated as "no summary".
    pub fn load_summary<P: SummaryProvider>(&self, provider: P) -> JoinHandle<()> {
        let events = self.events.clone();
        tokio::spawn(async move {
            let summary = match provider.fetch_summary().await {
                Ok(summary) => Some(summary),
                Err(e) => {
                    log::warn!("Summary unavailable from {}: {}", provider.metadata().name, e);
                    None
                }
            };
            if events.send(Event::SummaryLoaded(summary)).is_err() {
                log::debug!("Summary arrived after the player shut down");
            }
        })
    }

    /// Hands an already retrieved summary to the controller
    pub fn set_summary(&self, summary: Option<BookSummary>) -> PlayerResult<()> {
        self.push(Event::SummaryLoaded(summary))
    }

    /// Returns the state after every event queued before this call was handled
    pub async fn current_state(&self) -> PlayerResult<PlaybackSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.push(Event::Query(tx))?;
        rx.await.map_err(|_| PlayerError::Closed)
    }

    /// Latest published state without waiting
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.state.clone()
    }

    /// Stops the controller and its helper tasks
    pub fn shutdown(&self) -> PlayerResult<()> {
        self.push(Event::Shutdown)
    }
}

/// Owns the playback state and drives a [`Transport`]
pub struct PlaybackController<T: Transport> {
    transport: Arc<T>,
    options: PlayerOptions,
    state: PlaybackSnapshot,
    summary: Option<BookSummary>,
    /// Bumped on every chapter load
    generation: u64,
    events: WeakUnboundedSender<Event>,
    published: watch::Sender<PlaybackSnapshot>,
    poller: Poller,
    error_forwarder: Option<JoinHandle<()>>,
}

impl<T: Transport> PlaybackController<T> {
    /// Starts a controller task and returns its handle
    ///
    /// Must be called from within a tokio runtime. The task ends on
    /// [`PlayerHandle::shutdown`] or once every handle is dropped.
    pub fn spawn(transport: Arc<T>, options: PlayerOptions) -> PlayerHandle {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let initial = PlaybackSnapshot::new(options.initial_speed);
        let (published, state_rx) = watch::channel(initial.clone());

        transport.set_speed(options.initial_speed);

        let controller = Self {
            transport,
            options,
            state: initial,
            summary: None,
            generation: 0,
            events: events_tx.downgrade(),
            published,
            poller: Poller::default(),
            error_forwarder: None,
        };
        tokio::spawn(controller.run(events_rx));

        PlayerHandle {
            events: events_tx,
            state: state_rx,
        }
    }

    async fn run(mut self, mut events: UnboundedReceiver<Event>) {
        log::debug!("Playback controller started");

        while let Some(event) = events.recv().await {
            let shutting_down = matches!(event, Event::Shutdown);
            self.dispatch(event);
            self.publish();
            if shutting_down {
                break;
            }
        }

        self.stop_helpers();
        log::debug!("Playback controller stopped");
    }

    /// Handles one event and every follow-up it issues
    fn dispatch(&mut self, event: Event) {
        let mut pending = VecDeque::from([event]);
        while let Some(event) = pending.pop_front() {
            self.handle(event, &mut pending);
        }
    }

    fn publish(&self) {
        self.published.send_if_modified(|current| {
            if *current == self.state {
                false
            } else {
                *current = self.state.clone();
                true
            }
        });
    }

    fn handle(&mut self, event: Event, follow_ups: &mut VecDeque<Event>) {
        match event {
            Event::Command(command) => self.handle_command(command, follow_ups),
            Event::SummaryLoaded(summary) => self.on_summary_loaded(summary, follow_ups),
            Event::PollerTick => self.on_poller_tick(),
            Event::DurationFetched {
                generation,
                duration,
            } => {
                if generation == self.generation {
                    self.state.duration = duration;
                } else {
                    log::debug!("Dropping duration of superseded chapter");
                }
            }
            Event::ProgressSampled {
                generation,
                progress,
                duration,
            } => self.on_progress_sampled(generation, progress, duration, follow_ups),
            Event::TransportError(message) => {
                log::warn!("Playback error: {}", message);
                self.state.pending_error = Some(ErrorAlert::playback(message));
            }
            Event::Query(reply) => {
                let _ = reply.send(self.state.clone());
            }
            Event::Shutdown => self.stop_helpers(),
        }
    }

    fn handle_command(&mut self, command: PlayerCommand, follow_ups: &mut VecDeque<Event>) {
        match command {
            PlayerCommand::PlayChapter(index) => self.play_chapter(index, follow_ups),
            PlayerCommand::PlayNext => match &self.summary {
                Some(summary) if summary.contains_index(self.state.current_index + 1) => {
                    follow_ups.push_back(PlayerCommand::PlayChapter(self.state.current_index + 1).into());
                }
                _ => log::debug!("No next chapter after {}", self.state.current_index),
            },
            PlayerCommand::PlayPrevious => match &self.summary {
                Some(summary) if !summary.is_empty() => {
                    let previous = self.state.current_index.saturating_sub(1);
                    follow_ups.push_back(PlayerCommand::PlayChapter(previous).into());
                }
                _ => log::debug!("No chapters to go back to"),
            },
            PlayerCommand::Pause => {
                self.transport.pause();
                self.state.is_playing = self.transport.is_playing();
            }
            PlayerCommand::Resume => {
                self.transport.play();
                self.state.is_playing = self.transport.is_playing();
            }
            PlayerCommand::SeekTo(seconds) => {
                if self.state.is_editing {
                    log::debug!("Ignoring seek to {:.2}s while scrubbing", seconds);
                } else {
                    self.transport.seek(seconds);
                }
            }
            PlayerCommand::JumpBy(seconds) => self.transport.jump(seconds),
            PlayerCommand::SetEditing(editing) => self.state.is_editing = editing,
            PlayerCommand::SetSpeed(speed) => {
                self.state.playback_speed = speed;
                self.transport.set_speed(speed);
            }
            PlayerCommand::DismissError => self.state.pending_error = None,
            PlayerCommand::FetchDuration => self.fetch_duration(),
            PlayerCommand::StartPoller => self.start_poller(),
        }
    }

    fn on_summary_loaded(&mut self, summary: Option<BookSummary>, follow_ups: &mut VecDeque<Event>) {
        let Some(summary) = summary else {
            log::info!("No summary available, nothing to play");
            self.summary = None;
            self.state.summary = SummaryStatus::Unavailable;
            self.state.chapter_count = 0;
            self.state.cover_path = None;
            return;
        };

        log::info!("Summary loaded with {} chapters", summary.len());
        self.state.summary = SummaryStatus::Loaded;
        self.state.chapter_count = summary.len();
        self.state.cover_path = Some(summary.cover_path.clone());
        if !summary.is_empty() {
            follow_ups.push_back(PlayerCommand::PlayChapter(0).into());
        }
        self.summary = Some(summary);

        self.start_error_forwarder();
        self.start_poller();
    }

    fn play_chapter(&mut self, index: usize, follow_ups: &mut VecDeque<Event>) {
        let Some(chapter) = self.summary.as_ref().and_then(|s| s.chapter(index)).cloned() else {
            log::debug!("Ignoring request for chapter {}: out of range", index);
            return;
        };

        self.generation += 1;
        self.transport.load(chapter.audio_path());
        log::info!("Playing chapter {}: {}", index + 1, chapter.short_motto);

        self.state.current_index = index;
        self.state.is_playing = self.transport.is_playing();
        self.state.chapter_motto = chapter.short_motto;
        self.state.current_progress = 0.0;
        self.state.duration = 0.0;

        follow_ups.push_back(PlayerCommand::FetchDuration.into());
    }

    fn fetch_duration(&self) {
        let Some(events) = self.events.upgrade() else {
            return;
        };
        let transport = Arc::clone(&self.transport);
        let generation = self.generation;

        tokio::spawn(async move {
            let duration = transport.duration_seconds().await;
            let _ = events.send(Event::DurationFetched {
                generation,
                duration,
            });
        });
    }

    fn on_poller_tick(&self) {
        if self.state.is_editing || !self.transport.is_playing() {
            return;
        }
        let Some(events) = self.events.upgrade() else {
            return;
        };

        let progress = self.transport.current_position_seconds();
        let transport = Arc::clone(&self.transport);
        let generation = self.generation;

        tokio::spawn(async move {
            let duration = transport.duration_seconds().await;
            let _ = events.send(Event::ProgressSampled {
                generation,
                progress,
                duration,
            });
        });
    }

    fn on_progress_sampled(
        &mut self,
        generation: u64,
        progress: f64,
        duration: f64,
        follow_ups: &mut VecDeque<Event>,
    ) {
        if generation != self.generation || self.state.is_editing {
            return;
        }

        let known = duration.is_finite() && duration > 0.0;
        if known && duration - progress <= self.options.completion_threshold {
            log::info!("Chapter {} finished", self.state.current_index + 1);
            follow_ups.push_back(PlayerCommand::Pause.into());
            follow_ups.push_back(PlayerCommand::PlayNext.into());
        } else {
            self.state.current_progress = progress;
        }
    }

    fn start_poller(&mut self) {
        self.poller
            .restart(self.options.poll_interval, self.events.clone());
    }

    fn start_error_forwarder(&mut self) {
        if let Some(task) = self.error_forwarder.take() {
            task.abort();
        }

        let mut errors = self.transport.error_events();
        let events = self.events.clone();
        self.error_forwarder = Some(tokio::spawn(async move {
            while let Some(error) = errors.recv().await {
                let Some(events) = events.upgrade() else {
                    break;
                };
                if events.send(Event::TransportError(error.to_string())).is_err() {
                    break;
                }
            }
        }));
    }

    fn stop_helpers(&mut self) {
        self.poller.stop();
        if let Some(task) = self.error_forwarder.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chapterplay_core::Chapter;
    use media_engine::{MockTransport, TransportCall};
    use std::path::PathBuf;

    fn summary(chapters: usize) -> BookSummary {
        BookSummary::new(
            "bookCover.jpg",
            (1..=chapters)
                .map(|i| Chapter::new(format!("Motto {}", i), format!("sound{}.mp3", i)))
                .collect(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_speed_applied_on_start() {
        let transport = Arc::new(MockTransport::new());
        let options = PlayerOptions {
            initial_speed: PlaybackSpeed::OneAndHalf,
            ..PlayerOptions::default()
        };
        let handle = PlaybackController::spawn(Arc::clone(&transport), options);

        let state = handle.current_state().await.unwrap();
        assert_eq!(state.playback_speed, PlaybackSpeed::OneAndHalf);
        assert_eq!(transport.calls(), vec![TransportCall::SetSpeed(PlaybackSpeed::OneAndHalf)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_follow_ups_run_before_next_command() {
        let transport = Arc::new(MockTransport::new());
        let handle = PlaybackController::spawn(Arc::clone(&transport), PlayerOptions::default());
        handle.set_summary(Some(summary(3))).unwrap();
        handle.play_next().unwrap();
        handle.play_next().unwrap();

        let state = handle.current_state().await.unwrap();
        assert_eq!(state.current_index, 2);
        let loads: Vec<TransportCall> = transport
            .calls()
            .into_iter()
            .filter(|call| matches!(call, TransportCall::Load(_)))
            .collect();
        assert_eq!(
            loads,
            vec![
                TransportCall::Load(PathBuf::from("sound1.mp3")),
                TransportCall::Load(PathBuf::from("sound2.mp3")),
                TransportCall::Load(PathBuf::from("sound3.mp3")),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_rejected_after_shutdown() {
        let transport = Arc::new(MockTransport::new());
        let handle = PlaybackController::spawn(transport, PlayerOptions::default());
        handle.shutdown().unwrap();

        // Give the controller task a chance to exit
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(handle.play_next(), Err(PlayerError::Closed));
        assert_eq!(handle.current_state().await, Err(PlayerError::Closed));
    }
}
