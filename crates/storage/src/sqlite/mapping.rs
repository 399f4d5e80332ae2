use quiz_core::model::{Question, QuestionId, QuestionSet, QuestionSetId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn u64_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn set_id_from_i64(v: i64) -> Result<QuestionSetId, StorageError> {
    Ok(QuestionSetId::new(i64_to_u64("set_id", v)?))
}

pub(crate) fn set_id_to_i64(id: QuestionSetId) -> Result<i64, StorageError> {
    u64_to_i64("set_id", id.value())
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

pub(crate) fn question_id_to_i64(id: QuestionId) -> Result<i64, StorageError> {
    u64_to_i64("question_id", id.value())
}

pub(crate) fn map_question_row(row: &SqliteRow) -> Result<Question, StorageError> {
    Question::new(
        question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get::<String, _>("text").map_err(ser)?,
        row.try_get::<String, _>("answer").map_err(ser)?,
    )
    .map_err(ser)
}

/// Build a set from its row plus its already-ordered question rows.
pub(crate) fn map_set_row(
    row: &SqliteRow,
    question_rows: &[SqliteRow],
) -> Result<QuestionSet, StorageError> {
    let mut questions = Vec::with_capacity(question_rows.len());
    for q in question_rows {
        questions.push(map_question_row(q)?);
    }

    QuestionSet::from_persisted(
        set_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get::<String, _>("name").map_err(ser)?,
        questions,
        row.try_get("created_at").map_err(ser)?,
        row.try_get("updated_at").map_err(ser)?,
    )
    .map_err(ser)
}
