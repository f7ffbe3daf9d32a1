//! Cancellable per-question countdown.
//!
//! A [`Countdown`] owns at most one background tick task. Starting a new
//! countdown always cancels the previous task first, and dropping the
//! countdown aborts whatever is still running. Each start gets a new epoch;
//! ticks carry the epoch they were produced for, so a tick that was already
//! queued when its task was cancelled can be recognised and ignored.

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// One countdown step per second.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

/// A single tick emitted by a running countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub epoch: u64,
}

// Aborts the tick task on every exit path.
struct TickTask {
    epoch: u64,
    handle: JoinHandle<()>,
}

impl Drop for TickTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Handle to the repeating tick source bound to the active question.
pub struct Countdown {
    period: Duration,
    epoch: u64,
    task: Option<TickTask>,
}

impl Countdown {
    /// Creates an idle countdown. Periods below one millisecond are raised to it.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_TICK_PERIOD),
            epoch: 0,
            task: None,
        }
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Cancels any running task, then starts ticking into `ticks`.
    ///
    /// The first tick fires one period after the call. Must be called from
    /// within a tokio runtime. Returns the epoch of the new task.
    pub fn restart(&mut self, ticks: UnboundedSender<Tick>) -> u64 {
        self.cancel();
        self.epoch += 1;

        let epoch = self.epoch;
        let period = self.period;
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if ticks.send(Tick { epoch }).is_err() {
                    break;
                }
            }
        });

        log::debug!("countdown epoch {epoch} started");
        self.task = Some(TickTask { epoch, handle });
        epoch
    }

    /// Stops the running task, if any. Ticks it already queued become stale.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            log::debug!("countdown epoch {} cancelled", task.epoch);
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Epoch of the running task, `None` when idle.
    #[must_use]
    pub fn epoch(&self) -> Option<u64> {
        self.task.as_ref().map(|task| task.epoch)
    }

    /// True only for ticks produced by the task that is running now.
    #[must_use]
    pub fn is_current(&self, tick: Tick) -> bool {
        self.epoch() == Some(tick.epoch)
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_PERIOD)
    }
}

impl fmt::Debug for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Countdown")
            .field("period", &self.period)
            .field("epoch", &self.epoch)
            .field("running", &self.is_running())
            .finish()
    }
}
