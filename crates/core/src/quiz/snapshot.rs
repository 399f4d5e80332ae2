use serde::Serialize;

use super::event::Feedback;

/// Everything the student display needs to render one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuizSnapshot {
    pub running: bool,
    pub current_group_number: u32,
    pub total_groups: u32,
    pub is_last_group: bool,
    /// One-based position of the current question; `total_questions` once finished.
    pub question_number: usize,
    pub total_questions: usize,
    pub current_question_text: Option<String>,
    pub input: String,
    pub feedback: Feedback,
    pub score: u32,
    pub input_locked: bool,
    pub transitioning: bool,
    pub finished: bool,
    pub completed_groups: usize,
}

impl QuizSnapshot {
    /// Snapshot shown while no run is active.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            current_group_number: 1,
            total_groups: 1,
            is_last_group: true,
            ..Self::default()
        }
    }
}
