use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Postgres;
use sqlx::QueryBuilder;
use sqlx::Row;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::AccountRole;
use crate::account::models::AccountUpdate;
use crate::account::models::EmailAddress;
use crate::account::models::HospitalAffiliation;
use crate::account::ports::AccountRepository;

const SELECT_ACCOUNT: &str = r#"
    SELECT a.id, a.email, a.name, a.phone, a.role, a.password_digest,
           a.hospital_id, h.contract_ends_at, a.trainer_id, a.created_at
    FROM accounts a
    LEFT JOIN hospitals h ON h.id = a.hospital_id
"#;

pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_account(row: &PgRow) -> Result<Account, AccountError> {
        let hospital_id: Option<uuid::Uuid> = row.try_get("hospital_id").map_err(database_error)?;
        let role: String = row.try_get("role").map_err(database_error)?;

        Ok(Account {
            id: AccountId(row.try_get("id").map_err(database_error)?),
            email: EmailAddress::new(row.try_get("email").map_err(database_error)?)
                .map_err(|e| AccountError::DatabaseError(format!("Stored email is invalid: {e}")))?,
            name: row.try_get("name").map_err(database_error)?,
            phone: row.try_get("phone").map_err(database_error)?,
            role: role.parse::<AccountRole>()?,
            password_digest: row.try_get("password_digest").map_err(database_error)?,
            hospital: match hospital_id {
                Some(hospital_id) => Some(HospitalAffiliation {
                    hospital_id,
                    contract_ends_at: row.try_get("contract_ends_at").map_err(database_error)?,
                }),
                None => None,
            },
            trainer_id: row.try_get("trainer_id").map_err(database_error)?,
            created_at: row.try_get("created_at").map_err(database_error)?,
        })
    }

    fn write_error(e: sqlx::Error, email: Option<&EmailAddress>) -> AccountError {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() && db_err.constraint() == Some("accounts_email_key") {
                return AccountError::EmailAlreadyExists(
                    email.map(|email| email.to_string()).unwrap_or_default(),
                );
            }
        }
        AccountError::DatabaseError(e.to_string())
    }
}

fn database_error(e: sqlx::Error) -> AccountError {
    AccountError::DatabaseError(e.to_string())
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn insert(&self, account: Account) -> Result<Account, AccountError> {
        sqlx::query(
            r#"
            INSERT INTO accounts
                (id, email, name, phone, role, password_digest, hospital_id, trainer_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(account.id.0)
        .bind(account.email.as_str())
        .bind(&account.name)
        .bind(&account.phone)
        .bind(account.role.as_str())
        .bind(&account.password_digest)
        .bind(account.hospital.as_ref().map(|h| h.hospital_id))
        .bind(account.trainer_id)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::write_error(e, Some(&account.email)))?;

        Ok(account)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!("{SELECT_ACCOUNT} WHERE a.id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn find_by_identifier(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!("{SELECT_ACCOUNT} WHERE lower(a.email) = lower($1)"))
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn update_fields(
        &self,
        id: &AccountId,
        update: AccountUpdate,
    ) -> Result<(), AccountError> {
        if update.is_empty() {
            return Ok(());
        }

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE accounts SET ");
        let mut columns = builder.separated(", ");

        if let Some(name) = &update.name {
            columns.push("name = ");
            columns.push_bind_unseparated(name.clone());
        }
        if let Some(email) = &update.email {
            columns.push("email = ");
            columns.push_bind_unseparated(email.as_str().to_string());
        }
        if let Some(phone) = &update.phone {
            columns.push("phone = ");
            columns.push_bind_unseparated(phone.clone());
        }
        if let Some(digest) = &update.password_digest {
            columns.push("password_digest = ");
            columns.push_bind_unseparated(digest.clone());
        }
        if let Some(role) = update.role {
            columns.push("role = ");
            columns.push_bind_unseparated(role.as_str());
        }
        if let Some(hospital_id) = update.hospital_id {
            columns.push("hospital_id = ");
            columns.push_bind_unseparated(hospital_id);
        }
        if let Some(trainer_id) = update.trainer_id {
            columns.push("trainer_id = ");
            columns.push_bind_unseparated(trainer_id);
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id.0);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| Self::write_error(e, update.email.as_ref()))?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
