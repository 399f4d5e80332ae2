use std::sync::Arc;

use serde::Serialize;

use crate::model::Question;

use super::error::QuizError;
use super::event::{Feedback, QuizEvent};
use super::session::{QuizSession, SessionId};
use super::snapshot::QuizSnapshot;
use super::timing::{PendingTransition, TransitionTiming};

/// Final tally of one group's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GroupResult {
    pub group: u32,
    pub score: u32,
    pub total: usize,
}

/// What the host should offer once a group has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GroupOutcome {
    NextGroupAvailable { next_group: u32 },
    AllGroupsFinished,
}

#[derive(Debug)]
struct ActiveRun {
    questions: Arc<[Question]>,
    total_groups: u32,
    current_group: u32,
    session: QuizSession,
    results: Vec<GroupResult>,
}

impl ActiveRun {
    fn is_last_group(&self) -> bool {
        self.current_group >= self.total_groups
    }

    fn outcome(&self) -> GroupOutcome {
        if self.is_last_group() {
            GroupOutcome::AllGroupsFinished
        } else {
            GroupOutcome::NextGroupAvailable {
                next_group: self.current_group + 1,
            }
        }
    }
}

/// Runs the same question list for several groups, one after another.
///
/// Each group gets its own [`QuizSession`] with a fresh [`SessionId`]; a
/// session is dropped as soon as its group is advanced past or the run
/// exits, so transition tickets it issued become no-ops.
#[derive(Debug, Default)]
pub struct GroupProgression {
    timing: TransitionTiming,
    run: Option<ActiveRun>,
    next_session: u64,
    events: Vec<QuizEvent>,
}

impl GroupProgression {
    #[must_use]
    pub fn new(timing: TransitionTiming) -> Self {
        Self {
            timing,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn timing(&self) -> TransitionTiming {
        self.timing
    }

    /// Begin a run at group 1. `total_groups` is clamped to at least 1.
    ///
    /// Any run already in progress is replaced.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` and leaves the progression untouched
    /// when `questions` is empty.
    pub fn start(
        &mut self,
        questions: impl Into<Arc<[Question]>>,
        total_groups: u32,
    ) -> Result<(), QuizError> {
        let questions = questions.into();
        let session = self.open_session(questions.clone())?;
        let total_groups = total_groups.max(1);

        self.run = Some(ActiveRun {
            questions,
            total_groups,
            current_group: 1,
            session,
            results: Vec::new(),
        });
        self.events.push(QuizEvent::RunStarted { total_groups });
        self.events.push(QuizEvent::GroupStarted { group: 1 });
        Ok(())
    }

    /// Record the finished group and report what comes next.
    ///
    /// Called automatically when a transition finishes the session; calling
    /// it again for the same group returns the same outcome without
    /// recording twice.
    ///
    /// # Errors
    ///
    /// `NotRunning` without a run, `GroupInProgress` if the current session
    /// has not finished.
    pub fn on_group_finished(&mut self) -> Result<GroupOutcome, QuizError> {
        let run = self.run.as_mut().ok_or(QuizError::NotRunning)?;
        if !run.session.is_finished() {
            return Err(QuizError::GroupInProgress);
        }

        let already_recorded = run
            .results
            .last()
            .is_some_and(|result| result.group == run.current_group);
        if !already_recorded {
            run.results.push(GroupResult {
                group: run.current_group,
                score: run.session.score(),
                total: run.session.total(),
            });
            self.events.push(QuizEvent::GroupFinished {
                group: run.current_group,
                last_group: run.is_last_group(),
            });
        }
        Ok(run.outcome())
    }

    /// Replace the finished session with a fresh one for the next group.
    ///
    /// Returns the new group number.
    ///
    /// # Errors
    ///
    /// `NotRunning`, `GroupInProgress` while the current group is still
    /// answering, or `LastGroup` after the final group. State is unchanged
    /// on error.
    pub fn advance_group(&mut self) -> Result<u32, QuizError> {
        let run = self.run.as_ref().ok_or(QuizError::NotRunning)?;
        if !run.session.is_finished() {
            return Err(QuizError::GroupInProgress);
        }
        if run.is_last_group() {
            return Err(QuizError::LastGroup);
        }

        self.on_group_finished()?;
        let questions = match self.run.as_ref() {
            Some(run) => run.questions.clone(),
            None => return Err(QuizError::NotRunning),
        };
        let session = self.open_session(questions)?;

        let run = self.run.as_mut().ok_or(QuizError::NotRunning)?;
        run.current_group += 1;
        run.session = session;
        let group = run.current_group;
        self.events.push(QuizEvent::GroupStarted { group });
        Ok(group)
    }

    /// End the run wherever it is. Returns `false` if nothing was running.
    pub fn exit(&mut self) -> bool {
        match self.run.take() {
            Some(mut run) => {
                // Keep whatever the session reported before it is dropped.
                self.events.append(&mut run.session.take_events());
                self.events.push(QuizEvent::RunExited);
                true
            }
            None => false,
        }
    }

    /// Forward typed input to the current session.
    pub fn submit_input(&mut self, raw: &str) -> Option<PendingTransition> {
        let ticket = self.run.as_mut()?.session.submit_input(raw);
        self.collect_session_events();
        ticket
    }

    /// Forward an explicit answer check to the current session.
    pub fn submit_guess(&mut self) -> bool {
        let Some(run) = self.run.as_mut() else {
            return false;
        };
        let checked = run.session.submit_guess();
        self.collect_session_events();
        checked
    }

    /// Fire a transition checkpoint.
    ///
    /// Tickets from sessions that no longer exist are ignored. When the
    /// checkpoint finishes the session, the group result is recorded.
    pub fn elapse(&mut self, ticket: &PendingTransition) -> Option<PendingTransition> {
        let run = self.run.as_mut()?;
        if run.session.id() != ticket.session() {
            return None;
        }

        let was_finished = run.session.is_finished();
        let next = run.session.elapse(ticket);
        let now_finished = run.session.is_finished();
        self.collect_session_events();

        if now_finished && !was_finished {
            // Cannot fail: the run exists and its session just finished.
            let _ = self.on_group_finished();
        }
        next
    }

    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        self.run.as_ref().map(|run| &run.session)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// One-based; 1 when idle.
    #[must_use]
    pub fn current_group_number(&self) -> u32 {
        self.run.as_ref().map_or(1, |run| run.current_group)
    }

    /// 1 when idle.
    #[must_use]
    pub fn total_groups(&self) -> u32 {
        self.run.as_ref().map_or(1, |run| run.total_groups)
    }

    #[must_use]
    pub fn is_last_group(&self) -> bool {
        self.current_group_number() >= self.total_groups()
    }

    #[must_use]
    pub fn questions(&self) -> Option<&[Question]> {
        self.run.as_ref().map(|run| &*run.questions)
    }

    /// Results of the groups finished so far in this run.
    #[must_use]
    pub fn results(&self) -> &[GroupResult] {
        match self.run.as_ref() {
            Some(run) => &run.results,
            None => &[],
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> QuizSnapshot {
        let Some(run) = self.run.as_ref() else {
            return QuizSnapshot::idle();
        };
        let session = &run.session;
        let finished = session.is_finished();

        QuizSnapshot {
            running: true,
            current_group_number: run.current_group,
            total_groups: run.total_groups,
            is_last_group: run.is_last_group(),
            question_number: if finished {
                session.total()
            } else {
                session.current_index() + 1
            },
            total_questions: session.total(),
            current_question_text: session.current_question().map(|q| q.text().to_string()),
            input: session.input().to_string(),
            feedback: if finished {
                Feedback::None
            } else {
                session.feedback()
            },
            score: session.score(),
            input_locked: session.is_input_locked(),
            transitioning: session.is_transitioning(),
            finished,
            completed_groups: run.results.len(),
        }
    }

    /// Drain queued events from the progression and its current session.
    pub fn take_events(&mut self) -> Vec<QuizEvent> {
        self.collect_session_events();
        std::mem::take(&mut self.events)
    }

    fn open_session(&mut self, questions: Arc<[Question]>) -> Result<QuizSession, QuizError> {
        let id = SessionId::new(self.next_session);
        let session = QuizSession::new(id, questions, self.timing)?;
        self.next_session += 1;
        Ok(session)
    }

    fn collect_session_events(&mut self) {
        if let Some(run) = self.run.as_mut() {
            self.events.append(&mut run.session.take_events());
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;

    fn arithmetic() -> Vec<Question> {
        vec![
            Question::new(QuestionId::new(1), "2+2=", "4").unwrap(),
            Question::new(QuestionId::new(2), "3+3=", "6").unwrap(),
        ]
    }

    /// Answer every question of the current group correctly.
    fn play_group(progression: &mut GroupProgression) {
        let answers: Vec<String> = progression
            .questions()
            .unwrap()
            .iter()
            .map(|q| q.answer().to_string())
            .collect();
        for answer in answers {
            let dwell = progression.submit_input(&answer).expect("dwell ticket");
            let fade = progression.elapse(&dwell).expect("fade ticket");
            assert!(progression.elapse(&fade).is_none());
        }
    }

    #[test]
    fn start_without_questions_is_rejected() {
        let mut p = GroupProgression::default();
        assert_eq!(p.start(Vec::<Question>::new(), 3), Err(QuizError::NoQuestions));
        assert!(!p.is_running());
        assert!(p.session().is_none());
        assert_eq!(p.current_group_number(), 1);
        assert!(p.take_events().is_empty());
    }

    #[test]
    fn group_count_is_clamped() {
        let mut p = GroupProgression::default();
        p.start(arithmetic(), 0).unwrap();
        assert_eq!(p.total_groups(), 1);
        assert!(p.is_last_group());
    }

    #[test]
    fn start_opens_group_one() {
        let mut p = GroupProgression::default();
        p.start(arithmetic(), 3).unwrap();
        assert_eq!(p.current_group_number(), 1);
        assert_eq!(p.total_groups(), 3);
        assert!(!p.is_last_group());
        assert_eq!(p.session().unwrap().current_index(), 0);
        assert_eq!(
            p.take_events(),
            vec![
                QuizEvent::RunStarted { total_groups: 3 },
                QuizEvent::GroupStarted { group: 1 }
            ]
        );
    }

    #[test]
    fn finishing_a_group_records_result_and_offers_next() {
        let mut p = GroupProgression::default();
        p.start(arithmetic(), 2).unwrap();
        play_group(&mut p);

        assert_eq!(p.results(), &[GroupResult { group: 1, score: 2, total: 2 }]);
        assert_eq!(
            p.on_group_finished(),
            Ok(GroupOutcome::NextGroupAvailable { next_group: 2 })
        );
        // Asking again does not record twice.
        assert_eq!(p.results().len(), 1);

        let events = p.take_events();
        assert!(events.contains(&QuizEvent::Finished { score: 2, total: 2 }));
        assert_eq!(
            events.last(),
            Some(&QuizEvent::GroupFinished {
                group: 1,
                last_group: false
            })
        );
    }

    #[test]
    fn advance_gives_a_fresh_session_over_the_same_questions() {
        let questions = arithmetic();
        let mut p = GroupProgression::default();
        p.start(questions.clone(), 2).unwrap();
        let first_id = p.session().unwrap().id();
        play_group(&mut p);

        assert_eq!(p.advance_group(), Ok(2));
        let session = p.session().unwrap();
        assert_ne!(session.id(), first_id);
        assert_eq!(session.score(), 0);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.questions(), questions.as_slice());
        assert_eq!(p.current_group_number(), 2);
        assert!(p.is_last_group());
    }

    #[test]
    fn advance_is_refused_mid_group() {
        let mut p = GroupProgression::default();
        p.start(arithmetic(), 2).unwrap();
        p.submit_input("4");
        assert_eq!(p.advance_group(), Err(QuizError::GroupInProgress));
        assert_eq!(p.current_group_number(), 1);
        assert_eq!(p.session().unwrap().score(), 1);
    }

    #[test]
    fn advance_after_last_group_is_refused() {
        let mut p = GroupProgression::default();
        p.start(arithmetic(), 1).unwrap();
        play_group(&mut p);

        assert_eq!(p.on_group_finished(), Ok(GroupOutcome::AllGroupsFinished));
        assert_eq!(p.advance_group(), Err(QuizError::LastGroup));
        assert_eq!(p.current_group_number(), 1);
        assert!(p.session().unwrap().is_finished());
    }

    #[test]
    fn idle_progression_refuses_group_operations() {
        let mut p = GroupProgression::default();
        assert_eq!(p.on_group_finished(), Err(QuizError::NotRunning));
        assert_eq!(p.advance_group(), Err(QuizError::NotRunning));
        assert!(p.submit_input("4").is_none());
        assert!(!p.submit_guess());
        assert!(!p.exit());
    }

    #[test]
    fn exit_mid_quiz_resets_and_restart_is_fresh() {
        let mut p = GroupProgression::default();
        p.start(arithmetic(), 3).unwrap();
        play_group(&mut p);
        p.advance_group().unwrap();
        let dwell = p.submit_input("4").unwrap();

        assert!(p.exit());
        assert!(!p.is_running());
        assert_eq!(p.current_group_number(), 1);
        assert!(p.results().is_empty());
        assert_eq!(p.take_events().last(), Some(&QuizEvent::RunExited));

        // The pending transition from the discarded run is inert.
        assert!(p.elapse(&dwell).is_none());

        p.start(arithmetic(), 3).unwrap();
        assert!(p.elapse(&dwell).is_none());
        let session = p.session().unwrap();
        assert_eq!(session.score(), 0);
        assert_eq!(session.current_index(), 0);
        assert!(!session.is_transitioning());
    }

    #[test]
    fn stale_ticket_from_previous_group_is_ignored() {
        let mut p = GroupProgression::default();
        p.start(arithmetic(), 2).unwrap();

        let dwell = p.submit_input("4").unwrap();
        let fade = p.elapse(&dwell).unwrap();
        p.elapse(&fade);
        let last_dwell = p.submit_input("6").unwrap();
        let last_fade = p.elapse(&last_dwell).unwrap();
        p.elapse(&last_fade);
        p.advance_group().unwrap();

        p.submit_input("4").unwrap();
        assert!(p.elapse(&dwell).is_none());
        assert!(p.elapse(&last_fade).is_none());
        assert!(!p.session().unwrap().is_transitioning());
    }

    #[test]
    fn is_last_group_is_a_plain_comparison() {
        let mut p = GroupProgression::default();
        p.start(arithmetic(), 3).unwrap();
        for group in 1..=3 {
            assert_eq!(p.current_group_number(), group);
            assert_eq!(p.is_last_group(), group == 3);
            play_group(&mut p);
            if group < 3 {
                p.advance_group().unwrap();
            }
        }
        assert_eq!(p.results().len(), 3);
        assert!(p.current_group_number() <= p.total_groups());
    }

    #[test]
    fn snapshot_reflects_session_state() {
        let mut p = GroupProgression::default();
        assert_eq!(p.snapshot(), QuizSnapshot::idle());

        p.start(arithmetic(), 2).unwrap();
        p.submit_input("5");
        p.submit_guess();
        let snap = p.snapshot();
        assert!(snap.running);
        assert_eq!(snap.question_number, 1);
        assert_eq!(snap.total_questions, 2);
        assert_eq!(snap.current_question_text.as_deref(), Some("2+2="));
        assert_eq!(snap.input, "5");
        assert_eq!(snap.feedback, Feedback::Incorrect);
        assert!(!snap.input_locked);

        let dwell = p.submit_input("4").unwrap();
        let snap = p.snapshot();
        assert_eq!(snap.feedback, Feedback::Correct);
        assert_eq!(snap.score, 1);
        assert!(snap.input_locked);
        assert!(!snap.transitioning);

        p.elapse(&dwell);
        assert!(p.snapshot().transitioning);
    }

    #[test]
    fn snapshot_after_finish() {
        let mut p = GroupProgression::default();
        p.start(arithmetic(), 2).unwrap();
        play_group(&mut p);

        let snap = p.snapshot();
        assert!(snap.finished);
        assert_eq!(snap.question_number, 2);
        assert_eq!(snap.current_question_text, None);
        assert_eq!(snap.score, 2);
        assert_eq!(snap.completed_groups, 1);
        assert!(!snap.is_last_group);
    }
}
