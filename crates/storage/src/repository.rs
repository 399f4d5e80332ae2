use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{Question, QuestionId, QuestionSet, QuestionSetId};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Insert payload for a new question set; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewQuestionSetRecord {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a question appended to a set; the store assigns the id
/// and places it after the set's existing questions.
#[derive(Debug, Clone)]
pub struct NewQuestionRecord {
    pub set_id: QuestionSetId,
    pub text: String,
    pub answer: String,
}

/// Repository contract for question sets.
#[async_trait]
pub trait QuestionSetRepository: Send + Sync {
    /// Insert a new, empty set and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the set cannot be stored.
    async fn insert_new_set(&self, set: NewQuestionSetRecord)
    -> Result<QuestionSetId, StorageError>;

    /// Persist set metadata (name, timestamps). Questions are written through
    /// [`QuestionRepository`].
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the set cannot be stored.
    async fn upsert_set(&self, set: &QuestionSet) -> Result<(), StorageError>;

    /// Fetch a set with its questions in authoring order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or mapping failures.
    async fn get_set(&self, id: QuestionSetId) -> Result<Option<QuestionSet>, StorageError>;

    /// List sets ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or mapping failures.
    async fn list_sets(&self, limit: u32) -> Result<Vec<QuestionSet>, StorageError>;

    /// Delete a set and all of its questions.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the set does not exist.
    async fn delete_set(&self, id: QuestionSetId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Append a question to the end of a set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the set does not exist, or
    /// `StorageError::Serialization` if the question fails validation.
    async fn append_question(&self, question: NewQuestionRecord) -> Result<Question, StorageError>;

    /// Overwrite text and answer of a stored question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the question is not in the set.
    async fn update_question(
        &self,
        set_id: QuestionSetId,
        question: &Question,
    ) -> Result<(), StorageError>;

    /// Remove a question; the remaining questions keep their order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the question is not in the set.
    async fn delete_question(
        &self,
        set_id: QuestionSetId,
        id: QuestionId,
    ) -> Result<(), StorageError>;
}

#[derive(Default)]
struct MemoryState {
    sets: BTreeMap<QuestionSetId, QuestionSet>,
    last_set_id: u64,
    last_question_id: u64,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[async_trait]
impl QuestionSetRepository for InMemoryRepository {
    async fn insert_new_set(
        &self,
        set: NewQuestionSetRecord,
    ) -> Result<QuestionSetId, StorageError> {
        let mut guard = self.lock()?;
        let id = QuestionSetId::new(guard.last_set_id + 1);
        let record = QuestionSet::new(id, set.name, set.created_at).map_err(ser)?;
        guard.last_set_id += 1;
        guard.sets.insert(id, record);
        Ok(id)
    }

    async fn upsert_set(&self, set: &QuestionSet) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.last_set_id = guard.last_set_id.max(set.id().value());
        let merged = match guard.sets.get(&set.id()) {
            // Keep the stored questions; only metadata is written here.
            Some(existing) => QuestionSet::from_persisted(
                set.id(),
                set.name(),
                existing.questions().to_vec(),
                existing.created_at(),
                set.updated_at(),
            )
            .map_err(ser)?,
            None => QuestionSet::from_persisted(
                set.id(),
                set.name(),
                Vec::new(),
                set.created_at(),
                set.updated_at(),
            )
            .map_err(ser)?,
        };
        guard.sets.insert(set.id(), merged);
        Ok(())
    }

    async fn get_set(&self, id: QuestionSetId) -> Result<Option<QuestionSet>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.sets.get(&id).cloned())
    }

    async fn list_sets(&self, limit: u32) -> Result<Vec<QuestionSet>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .sets
            .values()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn delete_set(&self, id: QuestionSetId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard
            .sets
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn append_question(&self, question: NewQuestionRecord) -> Result<Question, StorageError> {
        let mut guard = self.lock()?;
        let id = QuestionId::new(guard.last_question_id + 1);
        let record = Question::new(id, question.text, question.answer).map_err(ser)?;

        let set = guard
            .sets
            .get_mut(&question.set_id)
            .ok_or(StorageError::NotFound)?;
        let updated_at = set.updated_at();
        set.push_question(record.clone(), updated_at)
            .map_err(|_| StorageError::Conflict)?;
        guard.last_question_id += 1;
        Ok(record)
    }

    async fn update_question(
        &self,
        set_id: QuestionSetId,
        question: &Question,
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let set = guard.sets.get_mut(&set_id).ok_or(StorageError::NotFound)?;
        if set.question(question.id()).is_none() {
            return Err(StorageError::NotFound);
        }
        let updated_at = set.updated_at();
        set.edit_question(question.id(), question.text(), question.answer(), updated_at)
            .map_err(ser)?;
        Ok(())
    }

    async fn delete_question(
        &self,
        set_id: QuestionSetId,
        id: QuestionId,
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let set = guard.sets.get_mut(&set_id).ok_or(StorageError::NotFound)?;
        let updated_at = set.updated_at();
        set.remove_question(id, updated_at)
            .map(|_| ())
            .map_err(|_| StorageError::NotFound)
    }
}

/// Aggregates set and question repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub question_sets: Arc<dyn QuestionSetRepository>,
    pub questions: Arc<dyn QuestionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let question_sets: Arc<dyn QuestionSetRepository> = Arc::new(repo.clone());
        let questions: Arc<dyn QuestionRepository> = Arc::new(repo);
        Self {
            question_sets,
            questions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    async fn seeded_set(repo: &InMemoryRepository) -> QuestionSetId {
        repo.insert_new_set(NewQuestionSetRecord {
            name: "Addition".into(),
            created_at: fixed_now(),
        })
        .await
        .unwrap()
    }

    fn new_question(set_id: QuestionSetId, text: &str, answer: &str) -> NewQuestionRecord {
        NewQuestionRecord {
            set_id,
            text: text.into(),
            answer: answer.into(),
        }
    }

    #[tokio::test]
    async fn appended_questions_keep_authoring_order() {
        let repo = InMemoryRepository::new();
        let set_id = seeded_set(&repo).await;

        let first = repo
            .append_question(new_question(set_id, "2+2=", "4"))
            .await
            .unwrap();
        let second = repo
            .append_question(new_question(set_id, "3+3=", "6"))
            .await
            .unwrap();
        assert_ne!(first.id(), second.id());

        let set = repo.get_set(set_id).await.unwrap().unwrap();
        let texts: Vec<_> = set.questions().iter().map(Question::text).collect();
        assert_eq!(texts, vec!["2+2=", "3+3="]);
    }

    #[tokio::test]
    async fn question_ids_are_unique_across_sets() {
        let repo = InMemoryRepository::new();
        let a = seeded_set(&repo).await;
        let b = seeded_set(&repo).await;
        let qa = repo.append_question(new_question(a, "1+1", "2")).await.unwrap();
        let qb = repo.append_question(new_question(b, "1+1", "2")).await.unwrap();
        assert_ne!(qa.id(), qb.id());
    }

    #[tokio::test]
    async fn append_to_missing_set_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo
            .append_question(new_question(QuestionSetId::new(9), "1+1", "2"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn upsert_keeps_questions() {
        let repo = InMemoryRepository::new();
        let set_id = seeded_set(&repo).await;
        repo.append_question(new_question(set_id, "2+2=", "4"))
            .await
            .unwrap();

        let mut set = repo.get_set(set_id).await.unwrap().unwrap();
        set.rename("Sums", fixed_now()).unwrap();
        repo.upsert_set(&set).await.unwrap();

        let stored = repo.get_set(set_id).await.unwrap().unwrap();
        assert_eq!(stored.name(), "Sums");
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn update_and_delete_question() {
        let repo = InMemoryRepository::new();
        let set_id = seeded_set(&repo).await;
        let q = repo
            .append_question(new_question(set_id, "2+2=", "5"))
            .await
            .unwrap();

        let fixed = q.edited("2+2=", "4").unwrap();
        repo.update_question(set_id, &fixed).await.unwrap();
        let set = repo.get_set(set_id).await.unwrap().unwrap();
        assert_eq!(set.question(q.id()).unwrap().answer(), "4");

        repo.delete_question(set_id, q.id()).await.unwrap();
        let err = repo.delete_question(set_id, q.id()).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
        assert!(repo.get_set(set_id).await.unwrap().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_set_and_list() {
        let repo = InMemoryRepository::new();
        let a = seeded_set(&repo).await;
        let b = seeded_set(&repo).await;
        assert_eq!(repo.list_sets(10).await.unwrap().len(), 2);
        assert_eq!(repo.list_sets(1).await.unwrap()[0].id(), a);

        repo.delete_set(a).await.unwrap();
        let remaining = repo.list_sets(10).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id(), b);
        assert!(matches!(
            repo.delete_set(a).await.unwrap_err(),
            StorageError::NotFound
        ));
    }
}
