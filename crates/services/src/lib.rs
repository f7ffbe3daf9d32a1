#![forbid(unsafe_code)]

pub mod clock;
pub mod countdown;
pub mod error;
pub mod sessions;

pub use clock::Clock;
pub use countdown::{Countdown, DEFAULT_TICK_PERIOD, Tick};
pub use error::SessionError;

pub use sessions::{
    Advance, QuizRunner, QuizSession, RunnerConfig, RunnerEvent, SessionProgress, SessionState,
    TickOutcome,
};
