use async_trait::async_trait;
use sqlx::PgPool;

use crate::account::errors::AccountError;
use crate::account::models::AccountId;
use crate::account::ports::MediaRecordRepository;

pub struct PostgresMediaRecordRepository {
    pool: PgPool,
}

impl PostgresMediaRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MediaRecordRepository for PostgresMediaRecordRepository {
    async fn delete_by_account(&self, id: &AccountId) -> Result<u64, AccountError> {
        let result = sqlx::query(
            r#"
            DELETE FROM media_records
            WHERE account_id = $1
            "#,
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
