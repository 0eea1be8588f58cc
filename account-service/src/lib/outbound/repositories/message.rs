use async_trait::async_trait;
use sqlx::PgPool;

use crate::account::errors::AccountError;
use crate::account::models::AccountId;
use crate::account::ports::MessageRepository;

pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn delete_involving(&self, id: &AccountId) -> Result<u64, AccountError> {
        let result = sqlx::query(
            r#"
            DELETE FROM messages
            WHERE sender_id = $1 OR recipient_id = $1
            "#,
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
