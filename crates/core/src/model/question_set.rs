use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{QuestionId, QuestionSetId};
use crate::model::question::{Question, QuestionError};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionSetError {
    #[error("set name cannot be empty")]
    EmptyName,

    #[error("question {0:?} already exists in this set")]
    DuplicateQuestion(QuestionId),

    #[error("question {0:?} is not part of this set")]
    UnknownQuestion(QuestionId),

    #[error(transparent)]
    Question(#[from] QuestionError),
}

//
// ─── QUESTION SET ──────────────────────────────────────────────────────────────
//

/// A named, ordered collection of questions authored by the teacher.
///
/// Question order is the order in which students see them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    id: QuestionSetId,
    name: String,
    questions: Vec<Question>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl QuestionSet {
    /// Creates an empty set.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetError::EmptyName` if the trimmed name is empty.
    pub fn new(
        id: QuestionSetId,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, QuestionSetError> {
        Self::from_persisted(id, name, Vec::new(), created_at, created_at)
    }

    /// Rehydrate a set from storage.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetError::EmptyName` for a blank name and
    /// `QuestionSetError::DuplicateQuestion` if two questions share an id.
    pub fn from_persisted(
        id: QuestionSetId,
        name: impl Into<String>,
        questions: Vec<Question>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, QuestionSetError> {
        let name = validate_name(name.into())?;
        for (idx, question) in questions.iter().enumerate() {
            if questions[..idx].iter().any(|q| q.id() == question.id()) {
                return Err(QuestionSetError::DuplicateQuestion(question.id()));
            }
        }

        Ok(Self {
            id,
            name,
            questions,
            created_at,
            updated_at,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> QuestionSetId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Rename the set.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetError::EmptyName` if the trimmed name is empty.
    pub fn rename(
        &mut self,
        name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), QuestionSetError> {
        self.name = validate_name(name.into())?;
        self.updated_at = now;
        Ok(())
    }

    /// Append a question at the end of the set.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetError::DuplicateQuestion` if the id is already used.
    pub fn push_question(
        &mut self,
        question: Question,
        now: DateTime<Utc>,
    ) -> Result<(), QuestionSetError> {
        if self.question(question.id()).is_some() {
            return Err(QuestionSetError::DuplicateQuestion(question.id()));
        }
        self.questions.push(question);
        self.updated_at = now;
        Ok(())
    }

    /// Replace text and answer of an existing question in place.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetError::UnknownQuestion` if the id is not in the set,
    /// or `QuestionSetError::Question` if the new fields are blank.
    pub fn edit_question(
        &mut self,
        id: QuestionId,
        text: impl Into<String>,
        answer: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<&Question, QuestionSetError> {
        let slot = self
            .questions
            .iter_mut()
            .find(|q| q.id() == id)
            .ok_or(QuestionSetError::UnknownQuestion(id))?;
        *slot = slot.edited(text, answer)?;
        self.updated_at = now;
        Ok(&*slot)
    }

    /// Remove a question, preserving the order of the rest.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetError::UnknownQuestion` if the id is not in the set.
    pub fn remove_question(
        &mut self,
        id: QuestionId,
        now: DateTime<Utc>,
    ) -> Result<Question, QuestionSetError> {
        let idx = self
            .questions
            .iter()
            .position(|q| q.id() == id)
            .ok_or(QuestionSetError::UnknownQuestion(id))?;
        self.updated_at = now;
        Ok(self.questions.remove(idx))
    }
}

fn validate_name(name: String) -> Result<String, QuestionSetError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(QuestionSetError::EmptyName);
    }
    Ok(trimmed.to_owned())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
