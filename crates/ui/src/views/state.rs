use dioxus::prelude::*;
use quiz_core::quiz::QuizError;
use services::{QuestionSetServiceError, QuizRunError, StorageError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    /// Blank name, text or answer.
    Invalid,
    NotFound,
    /// The selected set has no questions to quiz on.
    EmptySet,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::Invalid => "Please fill in every field.",
            ViewError::NotFound => "That item no longer exists.",
            ViewError::EmptySet => "Add at least one question before starting the quiz.",
            ViewError::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl From<QuestionSetServiceError> for ViewError {
    fn from(err: QuestionSetServiceError) -> Self {
        tracing::warn!(%err, "question set operation failed");
        match err {
            QuestionSetServiceError::QuestionSet(_) | QuestionSetServiceError::Question(_) => {
                ViewError::Invalid
            }
            QuestionSetServiceError::Storage(StorageError::NotFound) => ViewError::NotFound,
            _ => ViewError::Unknown,
        }
    }
}

impl From<QuizRunError> for ViewError {
    fn from(err: QuizRunError) -> Self {
        tracing::warn!(%err, "quiz operation failed");
        match err {
            QuizRunError::Quiz(QuizError::NoQuestions) => ViewError::EmptySet,
            _ => ViewError::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(*err),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}
