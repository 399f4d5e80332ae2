use std::time::Duration;

use super::session::SessionId;

/// Pacing of the transition that follows a correct answer.
///
/// `dwell` is how long the "correct" feedback stays on screen with the input
/// locked; `fade` is the transition during which the next question is
/// swapped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionTiming {
    dwell: Duration,
    fade: Duration,
}

impl TransitionTiming {
    pub const DEFAULT_DWELL: Duration = Duration::from_millis(1500);
    pub const DEFAULT_FADE: Duration = Duration::from_millis(300);

    #[must_use]
    pub const fn new(dwell: Duration, fade: Duration) -> Self {
        Self { dwell, fade }
    }

    #[must_use]
    pub const fn from_millis(dwell_ms: u64, fade_ms: u64) -> Self {
        Self::new(Duration::from_millis(dwell_ms), Duration::from_millis(fade_ms))
    }

    #[must_use]
    pub fn dwell(&self) -> Duration {
        self.dwell
    }

    #[must_use]
    pub fn fade(&self) -> Duration {
        self.fade
    }

    /// Latency from a correct answer until the next question accepts input.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.dwell + self.fade
    }

    #[must_use]
    pub fn delay_for(&self, stage: TransitionStage) -> Duration {
        match stage {
            TransitionStage::Dwell => self.dwell,
            TransitionStage::Fade => self.fade,
        }
    }
}

impl Default for TransitionTiming {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DWELL, Self::DEFAULT_FADE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionStage {
    Dwell,
    Fade,
}

/// Ticket for one scheduled checkpoint of a correct-answer transition.
///
/// The host waits `delay()` and hands the ticket back via `elapse`. Tickets
/// are bound to the session and answer that issued them; handing back a
/// ticket after that session moved on or was discarded does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingTransition {
    pub(crate) session: SessionId,
    pub(crate) seq: u64,
    pub(crate) stage: TransitionStage,
    pub(crate) delay: Duration,
}

impl PendingTransition {
    #[must_use]
    pub fn session(&self) -> SessionId {
        self.session
    }

    #[must_use]
    pub fn stage(&self) -> TransitionStage {
        self.stage
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}
