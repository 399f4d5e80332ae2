use quiz_core::model::{Question, QuestionId, QuestionSetId};

use super::SqliteRepository;
use super::mapping::{conn, question_id_from_i64, question_id_to_i64, ser, set_id_to_i64};
use crate::repository::{NewQuestionRecord, QuestionRepository, StorageError};

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn append_question(&self, question: NewQuestionRecord) -> Result<Question, StorageError> {
        // Validate before touching the database so blank fields never land in a row.
        let draft = Question::new(QuestionId::new(0), question.text, question.answer).map_err(ser)?;
        let set_id = set_id_to_i64(question.set_id)?;

        let mut tx = self.pool.begin().await.map_err(conn)?;

        let exists = sqlx::query("SELECT 1 FROM question_sets WHERE id = ?1")
            .bind(set_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(conn)?;
        if exists.is_none() {
            return Err(StorageError::NotFound);
        }

        let res = sqlx::query(
            r"
            INSERT INTO questions (set_id, position, text, answer)
            VALUES (
                ?1,
                (SELECT COALESCE(MAX(position) + 1, 0) FROM questions WHERE set_id = ?1),
                ?2,
                ?3
            )
            ",
        )
        .bind(set_id)
        .bind(draft.text().to_owned())
        .bind(draft.answer().to_owned())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;

        let id = question_id_from_i64(res.last_insert_rowid())?;
        Question::new(id, draft.text(), draft.answer()).map_err(ser)
    }

    async fn update_question(
        &self,
        set_id: QuestionSetId,
        question: &Question,
    ) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE questions
            SET text = ?3, answer = ?4
            WHERE id = ?1 AND set_id = ?2
            ",
        )
        .bind(question_id_to_i64(question.id())?)
        .bind(set_id_to_i64(set_id)?)
        .bind(question.text().to_owned())
        .bind(question.answer().to_owned())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_question(
        &self,
        set_id: QuestionSetId,
        id: QuestionId,
    ) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM questions WHERE id = ?1 AND set_id = ?2")
            .bind(question_id_to_i64(id)?)
            .bind(set_id_to_i64(set_id)?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
