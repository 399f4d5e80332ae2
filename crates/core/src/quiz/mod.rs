//! Student-facing quiz flow: one [`QuizSession`] per group, sequenced by a
//! [`GroupProgression`].

mod error;
mod event;
mod progression;
mod session;
mod snapshot;
mod timing;

pub use error::QuizError;
pub use event::{Feedback, QuizEvent};
pub use progression::{GroupOutcome, GroupProgression, GroupResult};
pub use session::{QuizSession, SessionId};
pub use snapshot::QuizSnapshot;
pub use timing::{PendingTransition, TransitionStage, TransitionTiming};
