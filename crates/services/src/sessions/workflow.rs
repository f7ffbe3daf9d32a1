use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use quiz_core::QuizResult;
use quiz_core::model::{Answer, QuestionId, Quiz};

use super::service::{Advance, QuizSession, TickOutcome};
use crate::Clock;
use crate::countdown::{Countdown, DEFAULT_TICK_PERIOD, Tick};
use crate::error::SessionError;

/// Something the presentation layer should react to.
#[derive(Debug, Clone, PartialEq)]
pub enum RunnerEvent {
    /// One second passed on the current question.
    Tick { remaining_secs: u32 },
    /// The session moved to question `index` with a fresh countdown.
    Advanced { index: usize },
    /// The quiz is over.
    Finished(QuizResult),
}

impl From<Advance> for RunnerEvent {
    fn from(advance: Advance) -> Self {
        match advance {
            Advance::Next { index } => RunnerEvent::Advanced { index },
            Advance::Finished(result) => RunnerEvent::Finished(result),
        }
    }
}

/// Knobs for a [`QuizRunner`].
#[derive(Debug, Clone, Copy)]
pub struct RunnerConfig {
    clock: Clock,
    tick_period: Duration,
}

impl RunnerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: Clock::system(),
            tick_period: DEFAULT_TICK_PERIOD,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Wall time of one countdown second. Shorter periods speed the quiz up.
    #[must_use]
    pub fn with_tick_period(mut self, tick_period: Duration) -> Self {
        self.tick_period = tick_period;
        self
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives a [`QuizSession`] with a live countdown.
///
/// The runner is the single owner of the session. Manual "next" actions go
/// through [`QuizRunner::advance`]; timer-driven ones come out of
/// [`QuizRunner::next_event`]. Both restart the countdown for the new
/// question, and both stop it for good once the quiz is graded.
#[derive(Debug)]
pub struct QuizRunner {
    session: QuizSession,
    clock: Clock,
    countdown: Countdown,
    tick_tx: UnboundedSender<Tick>,
    tick_rx: UnboundedReceiver<Tick>,
}

impl QuizRunner {
    /// Creates the session and starts the countdown for the first question.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidQuiz` if the quiz cannot be taken.
    pub fn start(quiz: Quiz, config: RunnerConfig) -> Result<Self, SessionError> {
        let session = QuizSession::new(quiz, config.clock().now())?;
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();

        let mut runner = Self {
            session,
            clock: config.clock(),
            countdown: Countdown::new(config.tick_period()),
            tick_tx,
            tick_rx,
        };
        runner.countdown.restart(runner.tick_tx.clone());
        Ok(runner)
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.session.is_complete()
    }

    /// True while a countdown task is bound to the current question.
    #[must_use]
    pub fn is_counting_down(&self) -> bool {
        self.countdown.is_running()
    }

    /// Record an answer. Rejections leave the countdown untouched.
    ///
    /// # Errors
    ///
    /// See [`QuizSession::submit_answer`].
    pub fn submit_answer(
        &mut self,
        question_id: &QuestionId,
        answer: Answer,
    ) -> Result<(), SessionError> {
        self.session
            .submit_answer(question_id, answer)
            .inspect_err(|err| log::warn!("answer for question {question_id} rejected: {err}"))
    }

    /// Manual "next": leave the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` if the quiz is already over.
    pub fn advance(&mut self) -> Result<RunnerEvent, SessionError> {
        let advance = self
            .session
            .advance(self.clock.now())
            .inspect_err(|err| log::warn!("advance rejected: {err}"))?;
        Ok(self.rebind_countdown(advance))
    }

    /// Wait for the next countdown tick and apply it.
    ///
    /// Ticks from a countdown that has since been replaced or cancelled are
    /// discarded. Returns `None` once the quiz is over. Cancel safe: dropping
    /// the future before it resolves loses no tick.
    pub async fn next_event(&mut self) -> Option<RunnerEvent> {
        loop {
            if self.session.is_complete() {
                return None;
            }

            let tick = self.tick_rx.recv().await?;
            if !self.countdown.is_current(tick) {
                log::debug!("discarding stale tick from epoch {}", tick.epoch);
                continue;
            }

            return match self.session.tick(self.clock.now()) {
                Ok(TickOutcome::Counting { remaining_secs }) => {
                    Some(RunnerEvent::Tick { remaining_secs })
                }
                Ok(TickOutcome::Expired(advance)) => Some(self.rebind_countdown(advance)),
                Err(err) => {
                    log::warn!("tick rejected: {err}");
                    self.countdown.cancel();
                    None
                }
            };
        }
    }

    /// Stops the countdown and hands back the session.
    #[must_use]
    pub fn into_session(mut self) -> QuizSession {
        self.countdown.cancel();
        self.session
    }

    fn rebind_countdown(&mut self, advance: Advance) -> RunnerEvent {
        match &advance {
            Advance::Next { .. } => {
                self.countdown.restart(self.tick_tx.clone());
            }
            Advance::Finished(_) => self.countdown.cancel(),
        }
        advance.into()
    }
}
