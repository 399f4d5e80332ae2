use std::sync::Arc;

use quiz_core::quiz::TransitionTiming;
use storage::repository::Storage;
use tracing::info;

use crate::Clock;
use crate::error::AppServicesError;
use crate::question_set_service::QuestionSetService;
use crate::quiz_runner::QuizRunner;

/// Assembles app-facing services.
#[derive(Clone)]
pub struct AppServices {
    question_sets: Arc<QuestionSetService>,
    quiz_runner: QuizRunner,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        timing: TransitionTiming,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        info!(db_url, "storage ready");
        Ok(Self::from_storage(&storage, clock, timing))
    }

    /// Build services over an existing storage bundle.
    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, timing: TransitionTiming) -> Self {
        let question_sets = Arc::new(QuestionSetService::new(
            clock,
            Arc::clone(&storage.question_sets),
            Arc::clone(&storage.questions),
        ));
        Self {
            question_sets,
            quiz_runner: QuizRunner::new(timing),
        }
    }

    /// In-memory services, for tests and previews.
    #[must_use]
    pub fn in_memory(clock: Clock, timing: TransitionTiming) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, timing)
    }

    #[must_use]
    pub fn question_sets(&self) -> Arc<QuestionSetService> {
        Arc::clone(&self.question_sets)
    }

    #[must_use]
    pub fn quiz_runner(&self) -> QuizRunner {
        self.quiz_runner.clone()
    }
}
