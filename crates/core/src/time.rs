use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Utc};

/// Source of wall-clock timestamps for set metadata and run reports.
///
/// `Manual` clocks share their instant between clones, so advancing a clock
/// held by a test is visible to every service that received a copy of it.
#[derive(Debug, Clone, Default)]
pub enum Clock {
    #[default]
    System,
    Manual(Arc<AtomicI64>),
}

impl Clock {
    /// Returns a clock that reads the system time.
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    /// Returns a manual clock starting at the given timestamp (millisecond precision).
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Manual(Arc::new(AtomicI64::new(at.timestamp_millis())))
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Manual(millis) => DateTime::<Utc>::from_timestamp_millis(
                millis.load(Ordering::Acquire),
            )
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        }
    }

    /// Moves a manual clock forward. No effect on the system clock.
    pub fn advance(&self, delta: Duration) {
        if let Clock::Manual(millis) = self {
            millis.fetch_add(delta.num_milliseconds(), Ordering::AcqRel);
        }
    }

    #[must_use]
    pub fn is_system(&self) -> bool {
        matches!(self, Clock::System)
    }
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Returns a manual `Clock` starting at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_is_shared_between_clones() {
        let clock = fixed_clock();
        let copy = clock.clone();
        clock.advance(Duration::seconds(90));
        assert_eq!(copy.now(), fixed_now() + Duration::seconds(90));
    }

    #[test]
    fn system_clock_ignores_advance() {
        let clock = Clock::system();
        clock.advance(Duration::days(3650));
        assert!(clock.now() < Utc::now() + Duration::days(1));
        assert!(clock.is_system());
    }
}
