use std::sync::{Arc, Mutex, MutexGuard};

use quiz_core::model::Question;
use quiz_core::quiz::{
    GroupOutcome, GroupProgression, GroupResult, PendingTransition, QuizError, QuizEvent,
    QuizSnapshot, TransitionTiming,
};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::error::QuizRunError;

const EVENT_BUFFER: usize = 64;

struct RunnerInner {
    progression: Mutex<GroupProgression>,
    snapshots: watch::Sender<QuizSnapshot>,
    events: broadcast::Sender<QuizEvent>,
}

/// Hosts the application's single quiz run.
///
/// Every operation forwards to a [`GroupProgression`], then publishes the
/// resulting snapshot on a watch channel and the drained events on a
/// broadcast channel. Correct answers hand back a [`PendingTransition`];
/// drive it with [`QuizRunner::run_transition`] on a spawned task.
#[derive(Clone)]
pub struct QuizRunner {
    inner: Arc<RunnerInner>,
}

impl QuizRunner {
    #[must_use]
    pub fn new(timing: TransitionTiming) -> Self {
        let (snapshots, _) = watch::channel(QuizSnapshot::idle());
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            inner: Arc::new(RunnerInner {
                progression: Mutex::new(GroupProgression::new(timing)),
                snapshots,
                events,
            }),
        }
    }

    /// Latest snapshot; receivers are notified on every change.
    #[must_use]
    pub fn subscribe_snapshots(&self) -> watch::Receiver<QuizSnapshot> {
        self.inner.snapshots.subscribe()
    }

    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<QuizEvent> {
        self.inner.events.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> QuizSnapshot {
        self.inner.snapshots.borrow().clone()
    }

    /// Pacing used for new runs.
    ///
    /// # Errors
    ///
    /// Returns `QuizRunError::Poisoned` if the state lock is poisoned.
    pub fn timing(&self) -> Result<TransitionTiming, QuizRunError> {
        Ok(self.lock()?.timing())
    }

    /// Results of the groups finished so far.
    ///
    /// # Errors
    ///
    /// Returns `QuizRunError::Poisoned` if the state lock is poisoned.
    pub fn results(&self) -> Result<Vec<GroupResult>, QuizRunError> {
        Ok(self.lock()?.results().to_vec())
    }

    /// Start a run over `questions` for `groups` groups (at least one).
    ///
    /// # Errors
    ///
    /// Returns `QuizRunError::Quiz(QuizError::NoQuestions)` for an empty list;
    /// nothing is published in that case.
    pub fn start(&self, questions: Vec<Question>, groups: u32) -> Result<QuizSnapshot, QuizRunError> {
        let question_count = questions.len();
        self.with_progression(|p| {
            p.start(questions, groups).inspect_err(|err| {
                warn!(%err, "quiz start refused");
            })
        })?;
        info!(questions = question_count, groups, "quiz run started");
        Ok(self.snapshot())
    }

    /// Record the answer box contents.
    ///
    /// Returns a ticket when the input completes a correct answer.
    ///
    /// # Errors
    ///
    /// Returns `QuizRunError::Poisoned` if the state lock is poisoned.
    pub fn type_answer(&self, raw: &str) -> Result<Option<PendingTransition>, QuizRunError> {
        self.with_progression(|p| Ok(p.submit_input(raw)))
    }

    /// Explicit check of the current answer.
    ///
    /// # Errors
    ///
    /// Returns `QuizRunError::Poisoned` if the state lock is poisoned.
    pub fn check_answer(&self) -> Result<bool, QuizRunError> {
        self.with_progression(|p| Ok(p.submit_guess()))
    }

    /// Outcome of the group that just finished.
    ///
    /// # Errors
    ///
    /// Returns `QuizRunError::Quiz` when no run is active or the group is
    /// still in progress.
    pub fn group_outcome(&self) -> Result<GroupOutcome, QuizRunError> {
        self.with_progression(|p| p.on_group_finished())
    }

    /// Move on to the next group.
    ///
    /// # Errors
    ///
    /// Returns `QuizRunError::Quiz` if the group has not finished or it was
    /// the last one.
    pub fn next_group(&self) -> Result<u32, QuizRunError> {
        let group = self.with_progression(|p| p.advance_group())?;
        info!(group, "next group started");
        Ok(group)
    }

    /// Abandon the run and return to the idle state.
    ///
    /// # Errors
    ///
    /// Returns `QuizRunError::Poisoned` if the state lock is poisoned.
    pub fn exit(&self) -> Result<bool, QuizRunError> {
        let exited = self.with_progression(|p| Ok(p.exit()))?;
        if exited {
            info!("quiz run exited");
        }
        Ok(exited)
    }

    /// Fire one checkpoint of a transition.
    ///
    /// # Errors
    ///
    /// Returns `QuizRunError::Poisoned` if the state lock is poisoned.
    pub fn elapse(&self, ticket: &PendingTransition) -> Result<Option<PendingTransition>, QuizRunError> {
        self.with_progression(|p| Ok(p.elapse(ticket)))
    }

    /// Wait out both checkpoints of a correct-answer transition.
    ///
    /// Stops early if the ticket goes stale, e.g. after `exit`.
    ///
    /// # Errors
    ///
    /// Returns `QuizRunError::Poisoned` if the state lock is poisoned.
    pub async fn run_transition(&self, ticket: PendingTransition) -> Result<(), QuizRunError> {
        let mut next = Some(ticket);
        while let Some(ticket) = next {
            tokio::time::sleep(ticket.delay()).await;
            next = self.elapse(&ticket)?;
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, GroupProgression>, QuizRunError> {
        self.inner
            .progression
            .lock()
            .map_err(|_| QuizRunError::Poisoned)
    }

    /// Run `f` under the lock, then publish the new snapshot and events.
    fn with_progression<T>(
        &self,
        f: impl FnOnce(&mut GroupProgression) -> Result<T, QuizError>,
    ) -> Result<T, QuizRunError> {
        let mut guard = self.lock()?;
        let result = f(&mut *guard);
        let events = guard.take_events();
        let snapshot = guard.snapshot();
        drop(guard);

        self.inner.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
        for event in events {
            debug!(?event, "quiz event");
            // No subscribers is fine.
            let _ = self.inner.events.send(event);
        }

        Ok(result?)
    }
}

impl Default for QuizRunner {
    fn default() -> Self {
        Self::new(TransitionTiming::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionId;

    fn questions() -> Vec<Question> {
        vec![Question::new(QuestionId::new(1), "2+2=", "4").unwrap()]
    }

    #[test]
    fn empty_start_publishes_nothing() {
        let runner = QuizRunner::default();
        let mut events = runner.subscribe_events();
        let snapshots = runner.subscribe_snapshots();

        let err = runner.start(Vec::new(), 3).unwrap_err();
        assert!(matches!(err, QuizRunError::Quiz(QuizError::NoQuestions)));
        assert!(!snapshots.has_changed().unwrap());
        assert!(events.try_recv().is_err());
        assert!(!runner.snapshot().running);
    }

    #[test]
    fn wrong_check_requests_selection() {
        let runner = QuizRunner::default();
        runner.start(questions(), 1).unwrap();
        let mut events = runner.subscribe_events();

        assert!(runner.type_answer("5").unwrap().is_none());
        assert!(runner.check_answer().unwrap());

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert!(seen.contains(&QuizEvent::SelectInput));
    }

    #[test]
    fn exit_is_idempotent() {
        let runner = QuizRunner::default();
        runner.start(questions(), 2).unwrap();
        assert!(runner.exit().unwrap());
        assert!(!runner.exit().unwrap());
        assert_eq!(runner.snapshot(), QuizSnapshot::idle());
    }
}
