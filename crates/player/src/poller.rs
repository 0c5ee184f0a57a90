//! Recurring progress sampling

use crate::command::Event;
use std::time::Duration;
use tokio::sync::mpsc::WeakUnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub(crate) const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Owns at most one running ticker task
#[derive(Debug, Default)]
pub(crate) struct Poller {
    task: Option<JoinHandle<()>>,
}

impl Poller {
    /// Starts ticking every `period`, aborting any previous ticker
    ///
    /// The first tick arrives one period after the start. The ticker ends on
    /// its own once the controller queue is gone. A zero period is replaced
    /// by [`DEFAULT_POLL_INTERVAL`].
    pub fn restart(&mut self, period: Duration, events: WeakUnboundedSender<Event>) {
        self.stop();

        let period = if period.is_zero() {
            log::warn!("Zero poll interval, using {:?}", DEFAULT_POLL_INTERVAL);
            DEFAULT_POLL_INTERVAL
        } else {
            period
        };

        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let Some(events) = events.upgrade() else {
                    break;
                };
                if events.send(Event::PollerTick).is_err() {
                    break;
                }
            }
        }));
        log::debug!("Progress poller started ({:?})", period);
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
