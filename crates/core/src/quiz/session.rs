use std::sync::Arc;

use serde::Serialize;

use crate::model::Question;

use super::error::QuizError;
use super::event::{Feedback, QuizEvent};
use super::timing::{PendingTransition, TransitionStage, TransitionTiming};

/// Identifies one group's run. Never reused within a progression, so tickets
/// issued by a discarded session cannot land on its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SessionId(u64);

impl SessionId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Answering,
    /// Correct answer shown, input locked, waiting for the dwell to elapse.
    Celebrating { seq: u64 },
    /// Dwell over, fading to the next question.
    Fading { seq: u64 },
    Finished,
}

/// One group's pass through an ordered question list.
///
/// Typing is evaluated on every change: an exact (case- and
/// whitespace-insensitive) match marks the question correct, bumps the score
/// and returns a [`PendingTransition`] for the host to schedule. Two
/// checkpoints follow, each driven by handing the ticket back to
/// [`QuizSession::elapse`]: the dwell ends (fade begins), then the fade ends
/// (next question or finish).
#[derive(Debug)]
pub struct QuizSession {
    id: SessionId,
    questions: Arc<[Question]>,
    timing: TransitionTiming,
    current: usize,
    input: String,
    feedback: Feedback,
    score: u32,
    phase: Phase,
    next_seq: u64,
    events: Vec<QuizEvent>,
}

impl QuizSession {
    /// Start a session at the first question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` if `questions` is empty.
    pub fn new(
        id: SessionId,
        questions: Arc<[Question]>,
        timing: TransitionTiming,
    ) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }

        Ok(Self {
            id,
            questions,
            timing,
            current: 0,
            input: String::new(),
            feedback: Feedback::None,
            score: 0,
            phase: Phase::Answering,
            next_seq: 0,
            events: Vec::new(),
        })
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn timing(&self) -> TransitionTiming {
        self.timing
    }

    /// Zero-based index of the current question; equals `total()` once finished.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[must_use]
    pub fn feedback(&self) -> Feedback {
        self.feedback
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// True during the fade between a correct answer and the next question.
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, Phase::Fading { .. })
    }

    /// True when typing is ignored: after a correct answer and after finishing.
    #[must_use]
    pub fn is_input_locked(&self) -> bool {
        self.phase != Phase::Answering
    }

    /// The checkpoint this session is waiting for, if any.
    #[must_use]
    pub fn pending(&self) -> Option<PendingTransition> {
        match self.phase {
            Phase::Celebrating { seq } => Some(self.ticket(seq, TransitionStage::Dwell)),
            Phase::Fading { seq } => Some(self.ticket(seq, TransitionStage::Fade)),
            Phase::Answering | Phase::Finished => None,
        }
    }

    /// Record the current contents of the answer box (stored trimmed).
    ///
    /// Feedback is recomputed from scratch: a stale marker is cleared, and a
    /// match sets `Correct`, increments the score and returns the dwell
    /// ticket. Ignored while locked.
    pub fn submit_input(&mut self, raw: &str) -> Option<PendingTransition> {
        if self.phase != Phase::Answering {
            return None;
        }

        let trimmed = raw.trim();
        self.input.clear();
        self.input.push_str(trimmed);

        let is_correct = self.current_question()?.is_correct(trimmed);
        if !is_correct {
            self.set_feedback(Feedback::None);
            return None;
        }

        self.set_feedback(Feedback::Correct);
        self.score = self.score.saturating_add(1);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.phase = Phase::Celebrating { seq };
        Some(self.ticket(seq, TransitionStage::Dwell))
    }

    /// Explicit "check" of a not-yet-correct answer.
    ///
    /// Marks the answer `Incorrect` and asks the host to select the input.
    /// Returns `false` (and changes nothing) while locked.
    pub fn submit_guess(&mut self) -> bool {
        if self.phase != Phase::Answering {
            return false;
        }
        self.set_feedback(Feedback::Incorrect);
        self.events.push(QuizEvent::SelectInput);
        true
    }

    /// Fire a checkpoint previously returned by this session.
    ///
    /// Returns the fade ticket when the dwell ends. Tickets from another
    /// session, an earlier answer or the wrong stage are ignored.
    pub fn elapse(&mut self, ticket: &PendingTransition) -> Option<PendingTransition> {
        if ticket.session != self.id {
            return None;
        }

        match (self.phase, ticket.stage) {
            (Phase::Celebrating { seq }, TransitionStage::Dwell) if seq == ticket.seq => {
                self.phase = Phase::Fading { seq };
                self.events.push(QuizEvent::TransitionStarted {
                    index: self.current,
                });
                Some(self.ticket(seq, TransitionStage::Fade))
            }
            (Phase::Fading { seq }, TransitionStage::Fade) if seq == ticket.seq => {
                self.advance();
                None
            }
            _ => None,
        }
    }

    /// Drain queued events in the order they happened.
    pub fn take_events(&mut self) -> Vec<QuizEvent> {
        std::mem::take(&mut self.events)
    }

    fn advance(&mut self) {
        self.input.clear();
        self.set_feedback(Feedback::None);

        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.phase = Phase::Answering;
            self.events.push(QuizEvent::QuestionChanged {
                index: self.current,
            });
        } else {
            self.current = self.questions.len();
            self.phase = Phase::Finished;
            self.events.push(QuizEvent::Finished {
                score: self.score,
                total: self.questions.len(),
            });
        }
    }

    fn set_feedback(&mut self, feedback: Feedback) {
        if self.feedback != feedback {
            self.feedback = feedback;
            self.events.push(QuizEvent::FeedbackChanged(feedback));
        }
    }

    fn ticket(&self, seq: u64, stage: TransitionStage) -> PendingTransition {
        PendingTransition {
            session: self.id,
            seq,
            stage,
            delay: self.timing.delay_for(stage),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
