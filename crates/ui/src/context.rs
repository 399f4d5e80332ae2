use std::sync::Arc;

use services::{AppServices, QuestionSetService, QuizRunner};

pub trait UiApp: Send + Sync {
    fn question_sets(&self) -> Arc<QuestionSetService>;
    fn quiz_runner(&self) -> QuizRunner;
}

impl UiApp for AppServices {
    fn question_sets(&self) -> Arc<QuestionSetService> {
        AppServices::question_sets(self)
    }

    fn quiz_runner(&self) -> QuizRunner {
        AppServices::quiz_runner(self)
    }
}

#[derive(Clone)]
pub struct AppContext {
    question_sets: Arc<QuestionSetService>,
    quiz_runner: QuizRunner,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            question_sets: app.question_sets(),
            quiz_runner: app.quiz_runner(),
        }
    }

    #[must_use]
    pub fn question_sets(&self) -> Arc<QuestionSetService> {
        Arc::clone(&self.question_sets)
    }

    /// Handle to the single quiz run shared by the dashboard and the quiz view.
    #[must_use]
    pub fn quiz_runner(&self) -> QuizRunner {
        self.quiz_runner.clone()
    }
}

// Provided by the composition root in `crates/app`.

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
