#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemoryRepository, NewQuestionRecord, NewQuestionSetRecord, QuestionRepository,
    QuestionSetRepository, Storage, StorageError,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
