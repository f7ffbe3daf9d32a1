use chrono::{DateTime, Duration, Utc};
use tokio::time::Instant;

/// Source of the wall-clock timestamps a session records.
///
/// An anchored clock pins a wall-clock time to a runtime instant and then
/// moves with the tokio clock. Session timestamps therefore stay in step with
/// the countdown, including when the runtime's time is paused or auto-advanced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Anchored { at: DateTime<Utc>, since: Instant },
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    /// Returns a clock that reads `at` right now and advances with the runtime.
    #[must_use]
    pub fn anchored(at: DateTime<Utc>) -> Self {
        Self::Anchored {
            at,
            since: Instant::now(),
        }
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Anchored { at, since } => Duration::from_std(since.elapsed())
                .ok()
                .and_then(|elapsed| at.checked_add_signed(elapsed))
                .unwrap_or(*at),
        }
    }
}

/// Deterministic timestamp for tests (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}
