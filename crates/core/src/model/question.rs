use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("answer cannot be empty")]
    EmptyAnswer,
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single prompt shown to students together with its canonical answer.
///
/// Text and answer are stored trimmed. Matching a student's input against the
/// answer ignores surrounding whitespace and letter case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    text: String,
    answer: String,
}

impl Question {
    /// Creates a question, trimming text and answer.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyText` or `QuestionError::EmptyAnswer` when
    /// either field is blank after trimming.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        answer: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let (text, answer) = validate_fields(text.into(), answer.into())?;
        Ok(Self { id, text, answer })
    }

    /// Returns a copy with new text and answer, keeping the id.
    ///
    /// # Errors
    ///
    /// Same validation as [`Question::new`].
    pub fn edited(
        &self,
        text: impl Into<String>,
        answer: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        Self::new(self.id, text, answer)
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// True when `input` equals the answer, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn is_correct(&self, input: &str) -> bool {
        normalize_answer(input) == normalize_answer(&self.answer)
    }
}

fn normalize_answer(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn validate_fields(text: String, answer: String) -> Result<(String, String), QuestionError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(QuestionError::EmptyText);
    }
    let answer = answer.trim();
    if answer.is_empty() {
        return Err(QuestionError::EmptyAnswer);
    }
    Ok((text.to_owned(), answer.to_owned()))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
