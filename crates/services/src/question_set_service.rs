use std::sync::Arc;

use quiz_core::expr;
use quiz_core::model::{Question, QuestionId, QuestionSet, QuestionSetId};
use serde::{Deserialize, Serialize};
use storage::repository::{
    NewQuestionRecord, NewQuestionSetRecord, QuestionRepository, QuestionSetRepository,
    StorageError,
};
use tracing::{debug, info};

use crate::Clock;
use crate::error::QuestionSetServiceError;

/// Portable form of a question set: `{id, name, questions:[{id,text,answer}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedSet {
    pub id: QuestionSetId,
    pub name: String,
    pub questions: Vec<ExportedQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedQuestion {
    pub id: QuestionId,
    pub text: String,
    pub answer: String,
}

impl From<&QuestionSet> for ExportedSet {
    fn from(set: &QuestionSet) -> Self {
        Self {
            id: set.id(),
            name: set.name().to_owned(),
            questions: set
                .questions()
                .iter()
                .map(|q| ExportedQuestion {
                    id: q.id(),
                    text: q.text().to_owned(),
                    answer: q.answer().to_owned(),
                })
                .collect(),
        }
    }
}

/// Authoring operations on question sets and their questions.
#[derive(Clone)]
pub struct QuestionSetService {
    clock: Clock,
    sets: Arc<dyn QuestionSetRepository>,
    questions: Arc<dyn QuestionRepository>,
}

impl QuestionSetService {
    #[must_use]
    pub fn new(
        clock: Clock,
        sets: Arc<dyn QuestionSetRepository>,
        questions: Arc<dyn QuestionRepository>,
    ) -> Self {
        Self {
            clock,
            sets,
            questions,
        }
    }

    /// Create an empty set and return its id.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetServiceError::QuestionSet` for a blank name.
    /// Returns `QuestionSetServiceError::Storage` if persistence fails.
    pub async fn create_set(&self, name: &str) -> Result<QuestionSetId, QuestionSetServiceError> {
        let now = self.clock.now();
        let draft = QuestionSet::new(QuestionSetId::new(1), name, now)?;
        let id = self
            .sets
            .insert_new_set(NewQuestionSetRecord {
                name: draft.name().to_owned(),
                created_at: now,
            })
            .await?;
        info!(set_id = id.value(), name = draft.name(), "question set created");
        Ok(id)
    }

    /// List sets ordered by id, up to the given limit.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetServiceError::Storage` if repository access fails.
    pub async fn list_sets(&self, limit: u32) -> Result<Vec<QuestionSet>, QuestionSetServiceError> {
        Ok(self.sets.list_sets(limit).await?)
    }

    /// Fetch a set with its questions. `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetServiceError::Storage` if repository access fails.
    pub async fn get_set(
        &self,
        id: QuestionSetId,
    ) -> Result<Option<QuestionSet>, QuestionSetServiceError> {
        Ok(self.sets.get_set(id).await?)
    }

    /// Rename a set, keeping its questions.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetServiceError::QuestionSet` for a blank name, or
    /// `Storage(NotFound)` if the set does not exist.
    pub async fn rename_set(
        &self,
        id: QuestionSetId,
        name: &str,
    ) -> Result<(), QuestionSetServiceError> {
        let mut set = self.load(id).await?;
        set.rename(name, self.clock.now())?;
        self.sets.upsert_set(&set).await?;
        Ok(())
    }

    /// Delete a set and its questions.
    ///
    /// # Errors
    ///
    /// Returns `Storage(NotFound)` if the set does not exist.
    pub async fn delete_set(&self, id: QuestionSetId) -> Result<(), QuestionSetServiceError> {
        self.sets.delete_set(id).await?;
        info!(set_id = id.value(), "question set deleted");
        Ok(())
    }

    /// Append a question to the end of a set.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetServiceError::Question` if text or answer is blank,
    /// or `Storage(NotFound)` if the set does not exist.
    pub async fn add_question(
        &self,
        set_id: QuestionSetId,
        text: &str,
        answer: &str,
    ) -> Result<Question, QuestionSetServiceError> {
        let draft = Question::new(QuestionId::new(1), text, answer)?;
        let mut set = self.load(set_id).await?;

        let stored = self
            .questions
            .append_question(NewQuestionRecord {
                set_id,
                text: draft.text().to_owned(),
                answer: draft.answer().to_owned(),
            })
            .await?;
        set.push_question(stored.clone(), self.clock.now())?;
        self.sets.upsert_set(&set).await?;

        debug!(
            set_id = set_id.value(),
            question_id = stored.id().value(),
            "question added"
        );
        Ok(stored)
    }

    /// Replace text and answer of a question in place.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetServiceError::QuestionSet` for an unknown question or
    /// blank fields, or `Storage(NotFound)` if the set does not exist.
    pub async fn update_question(
        &self,
        set_id: QuestionSetId,
        question_id: QuestionId,
        text: &str,
        answer: &str,
    ) -> Result<Question, QuestionSetServiceError> {
        let mut set = self.load(set_id).await?;
        let updated = set
            .edit_question(question_id, text, answer, self.clock.now())?
            .clone();
        self.questions.update_question(set_id, &updated).await?;
        self.sets.upsert_set(&set).await?;
        Ok(updated)
    }

    /// Remove a question; the rest keep their order.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetServiceError::QuestionSet` for an unknown question,
    /// or `Storage(NotFound)` if the set does not exist.
    pub async fn delete_question(
        &self,
        set_id: QuestionSetId,
        question_id: QuestionId,
    ) -> Result<(), QuestionSetServiceError> {
        let mut set = self.load(set_id).await?;
        set.remove_question(question_id, self.clock.now())?;
        self.questions.delete_question(set_id, question_id).await?;
        self.sets.upsert_set(&set).await?;
        Ok(())
    }

    /// Suggested answer for an arithmetic prompt, if it is one.
    #[must_use]
    pub fn suggest_answer(&self, text: &str) -> Option<String> {
        expr::evaluate(text)
    }

    /// Serialize a set as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `Storage(NotFound)` if the set does not exist.
    pub async fn export_set(&self, id: QuestionSetId) -> Result<String, QuestionSetServiceError> {
        let set = self.load(id).await?;
        Ok(serde_json::to_string_pretty(&ExportedSet::from(&set))?)
    }

    /// Create a new set from exported JSON. Ids in the file are ignored;
    /// questions keep their order.
    ///
    /// Every question is validated before anything is written.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetServiceError::Format` for malformed JSON and the
    /// usual validation and storage errors otherwise.
    pub async fn import_set(&self, json: &str) -> Result<QuestionSetId, QuestionSetServiceError> {
        let exported: ExportedSet = serde_json::from_str(json)?;
        let now = self.clock.now();
        QuestionSet::new(QuestionSetId::new(1), exported.name.as_str(), now)?;
        for q in &exported.questions {
            Question::new(q.id, q.text.as_str(), q.answer.as_str())?;
        }

        let set_id = self.create_set(&exported.name).await?;
        for q in &exported.questions {
            self.add_question(set_id, &q.text, &q.answer).await?;
        }
        info!(
            set_id = set_id.value(),
            questions = exported.questions.len(),
            "question set imported"
        );
        Ok(set_id)
    }

    async fn load(&self, id: QuestionSetId) -> Result<QuestionSet, QuestionSetServiceError> {
        Ok(self.sets.get_set(id).await?.ok_or(StorageError::NotFound)?)
    }
}
