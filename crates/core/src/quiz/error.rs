use thiserror::Error;

/// Refusals from the quiz state machines. None of them mutate state.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("Please add at least one question to the set before starting.")]
    NoQuestions,

    #[error("no quiz is running")]
    NotRunning,

    #[error("the current group has not finished yet")]
    GroupInProgress,

    #[error("the current group is the last one")]
    LastGroup,
}
