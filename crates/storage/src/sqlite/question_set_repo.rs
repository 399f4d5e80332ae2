use quiz_core::model::{QuestionSet, QuestionSetId};
use sqlx::{Row, SqlitePool};
use sqlx::sqlite::SqliteRow;

use super::SqliteRepository;
use super::mapping::{conn, map_set_row, ser, set_id_from_i64, set_id_to_i64};
use crate::repository::{NewQuestionSetRecord, QuestionSetRepository, StorageError};

async fn question_rows(pool: &SqlitePool, set_id: i64) -> Result<Vec<SqliteRow>, StorageError> {
    sqlx::query(
        r"
        SELECT id, text, answer
        FROM questions
        WHERE set_id = ?1
        ORDER BY position ASC, id ASC
        ",
    )
    .bind(set_id)
    .fetch_all(pool)
    .await
    .map_err(conn)
}

#[async_trait::async_trait]
impl QuestionSetRepository for SqliteRepository {
    async fn insert_new_set(
        &self,
        set: NewQuestionSetRecord,
    ) -> Result<QuestionSetId, StorageError> {
        let draft = QuestionSet::new(QuestionSetId::new(0), set.name, set.created_at).map_err(ser)?;
        let res = sqlx::query(
            r"
            INSERT INTO question_sets (name, created_at, updated_at)
            VALUES (?1, ?2, ?2)
            ",
        )
        .bind(draft.name().to_owned())
        .bind(draft.created_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        set_id_from_i64(res.last_insert_rowid())
    }

    async fn upsert_set(&self, set: &QuestionSet) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO question_sets (id, name, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                updated_at = excluded.updated_at
            ",
        )
        .bind(set_id_to_i64(set.id())?)
        .bind(set.name().to_owned())
        .bind(set.created_at())
        .bind(set.updated_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_set(&self, id: QuestionSetId) -> Result<Option<QuestionSet>, StorageError> {
        let set_id = set_id_to_i64(id)?;
        let row = sqlx::query(
            r"
            SELECT id, name, created_at, updated_at
            FROM question_sets WHERE id = ?1
            ",
        )
        .bind(set_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        match row {
            Some(row) => {
                let questions = question_rows(&self.pool, set_id).await?;
                map_set_row(&row, &questions).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn list_sets(&self, limit: u32) -> Result<Vec<QuestionSet>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, created_at, updated_at
            FROM question_sets
            ORDER BY id ASC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut sets = Vec::with_capacity(rows.len());
        for row in rows {
            let set_id: i64 = row.try_get("id").map_err(ser)?;
            let questions = question_rows(&self.pool, set_id).await?;
            sets.push(map_set_row(&row, &questions)?);
        }
        Ok(sets)
    }

    async fn delete_set(&self, id: QuestionSetId) -> Result<(), StorageError> {
        // Questions go with the set through ON DELETE CASCADE.
        let res = sqlx::query("DELETE FROM question_sets WHERE id = ?1")
            .bind(set_id_to_i64(id)?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
