use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::block_repository::BlockRepository;
use crate::domain::block::BlockEntry;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct PostgresBlockRepository {
    pool: PgPool,
}

impl PostgresBlockRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BlockRow {
    id: i64,
    user_id: i64,
    email: String,
    blocked_by: i64,
    created_at: DateTime<Utc>,
}

impl From<BlockRow> for BlockEntry {
    fn from(row: BlockRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            email: row.email,
            blocked_by: row.blocked_by,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl BlockRepository for PostgresBlockRepository {
    async fn is_blocked(&self, user_id: i64) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM blocked_users WHERE user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_block_db_error)
    }

    async fn block(&self, user_id: i64, blocked_by: i64) -> Result<BlockEntry, DomainError> {
        let row = sqlx::query_as::<_, BlockRow>(
            r#"
            WITH inserted AS (
                INSERT INTO blocked_users (user_id, blocked_by)
                VALUES ($1, $2)
                RETURNING id, user_id, blocked_by, created_at
            )
            SELECT i.id, i.user_id, u.email, i.blocked_by, i.created_at
            FROM inserted i
            JOIN users u ON u.id = i.user_id
            "#,
        )
        .bind(user_id)
        .bind(blocked_by)
        .fetch_one(&self.pool)
        .await
        .map_err(map_block_db_error)?;

        Ok(row.into())
    }

    async fn unblock(&self, user_id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM blocked_users WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_block_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_blocked(&self) -> Result<Vec<BlockEntry>, DomainError> {
        let rows = sqlx::query_as::<_, BlockRow>(
            r#"
            SELECT b.id, b.user_id, u.email, b.blocked_by, b.created_at
            FROM blocked_users b
            JOIN users u ON u.id = b.user_id
            ORDER BY b.created_at DESC, b.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_block_db_error)?;

        Ok(rows.into_iter().map(BlockEntry::from).collect())
    }
}

fn map_block_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => {
                return DomainError::AlreadyExists("User already blocked".to_string());
            }
            Some("23503") => return DomainError::NotFound("User not found".to_string()),
            _ => {}
        }
    }
    DomainError::Unexpected(err.to_string())
}
