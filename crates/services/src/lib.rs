#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod question_set_service;
pub mod quiz_runner;

pub use quiz_core::Clock;
pub use storage::repository::StorageError;

pub use app_services::AppServices;
pub use error::{AppServicesError, QuestionSetServiceError, QuizRunError};
pub use question_set_service::{ExportedQuestion, ExportedSet, QuestionSetService};
pub use quiz_runner::QuizRunner;
