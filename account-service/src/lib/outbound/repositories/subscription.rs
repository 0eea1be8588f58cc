use async_trait::async_trait;
use sqlx::PgPool;

use crate::account::errors::AccountError;
use crate::account::models::AccountId;
use crate::account::ports::SubscriptionRepository;

pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn deactivate_for_account(&self, id: &AccountId) -> Result<u64, AccountError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = 'inactive', ended_at = NOW()
            WHERE account_id = $1 AND status = 'active'
            "#,
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
