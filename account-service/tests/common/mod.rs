#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use account_service::account::eraser::AccountEraser;
use account_service::account::eraser::ErasureStores;
use account_service::account::eraser::StepPolicy;
use account_service::account::errors::AccountError;
use account_service::account::models::Account;
use account_service::account::models::AccountId;
use account_service::account::models::AccountRole;
use account_service::account::models::AccountUpdate;
use account_service::account::models::EmailAddress;
use account_service::account::models::HospitalAffiliation;
use account_service::account::ports::AccountRepository;
use account_service::account::ports::MediaRecordRepository;
use account_service::account::ports::MessageRepository;
use account_service::account::ports::SubscriptionRepository;
use account_service::domain::account::service::AccountService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::storage::FilesystemMediaStore;
use async_trait::async_trait;
use auth::Authenticator;
use auth::LegacyTokenCodec;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgConnectOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::Connection;
use sqlx::Executor;
use sqlx::PgConnection;
use sqlx::PgPool;
use tempfile::TempDir;
use uuid::Uuid;

pub const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const LEGACY_SECRET: &[u8] = b"legacy-cookie-secret";
pub const CONFIRMATION_PHRASE: &str = "delete my account";

/// Rows the erasure cascade touches, kept in memory.
#[derive(Default)]
pub struct InMemoryStore {
    pub accounts: Mutex<HashMap<AccountId, Account>>,
    /// (account, active)
    pub subscriptions: Mutex<Vec<(AccountId, bool)>>,
    pub media_records: Mutex<Vec<AccountId>>,
    /// (sender, recipient)
    pub messages: Mutex<Vec<(AccountId, AccountId)>>,
}

impl InMemoryStore {
    pub fn account(&self, id: &AccountId) -> Option<Account> {
        self.accounts.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn insert(&self, account: Account) -> Result<Account, AccountError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts
            .values()
            .any(|a| a.email.as_str().eq_ignore_ascii_case(account.email.as_str()))
        {
            return Err(AccountError::EmailAlreadyExists(account.email.to_string()));
        }
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        Ok(self.account(id))
    }

    async fn find_by_identifier(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Account>, AccountError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .find(|a| a.email.as_str().eq_ignore_ascii_case(email.as_str()))
            .cloned())
    }

    async fn update_fields(
        &self,
        id: &AccountId,
        update: AccountUpdate,
    ) -> Result<(), AccountError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get_mut(id)
            .ok_or_else(|| AccountError::NotFound(id.to_string()))?;
        update.apply_to(account);
        Ok(())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryStore {
    async fn deactivate_for_account(&self, id: &AccountId) -> Result<u64, AccountError> {
        let mut changed = 0;
        for (owner, active) in self.subscriptions.lock().unwrap().iter_mut() {
            if owner == id && *active {
                *active = false;
                changed += 1;
            }
        }
        Ok(changed)
    }
}

#[async_trait]
impl MediaRecordRepository for InMemoryStore {
    async fn delete_by_account(&self, id: &AccountId) -> Result<u64, AccountError> {
        let mut records = self.media_records.lock().unwrap();
        let before = records.len();
        records.retain(|owner| owner != id);
        Ok((before - records.len()) as u64)
    }
}

#[async_trait]
impl MessageRepository for InMemoryStore {
    async fn delete_involving(&self, id: &AccountId) -> Result<u64, AccountError> {
        let mut messages = self.messages.lock().unwrap();
        let before = messages.len();
        messages.retain(|(sender, recipient)| sender != id && recipient != id);
        Ok((before - messages.len()) as u64)
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryStore>,
    pub service: Arc<AccountService<InMemoryStore>>,
    pub authenticator: Arc<Authenticator>,
    pub api_client: reqwest::Client,
    pub media_root: PathBuf,
    _media_dir: TempDir,
}

impl TestApp {
    /// Spawn with legacy session cookies enabled.
    pub async fn spawn() -> Self {
        Self::spawn_with_legacy(true).await
    }

    pub async fn spawn_with_legacy(legacy_enabled: bool) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let media_dir = TempDir::new().expect("Failed to create media directory");
        let media_root = media_dir.path().to_path_buf();

        let mut authenticator = Authenticator::new(SECRET);
        if legacy_enabled {
            authenticator = authenticator.with_legacy_secret(LEGACY_SECRET);
        }
        let authenticator = Arc::new(authenticator);

        let store = Arc::new(InMemoryStore::default());
        let eraser = AccountEraser::new(
            ErasureStores {
                accounts: store.clone(),
                subscriptions: store.clone(),
                media: Arc::new(FilesystemMediaStore::new(media_root.clone())),
                media_records: store.clone(),
                messages: store.clone(),
            },
            StepPolicy {
                timeout: Duration::from_secs(2),
                max_attempts: 2,
            },
        );

        let service = Arc::new(AccountService::new(
            store.clone(),
            authenticator.clone(),
            eraser,
            CONFIRMATION_PHRASE.to_string(),
        ));

        let router = create_router(service.clone(), authenticator.clone(), false);

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            store,
            service,
            authenticator,
            api_client: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .expect("Failed to create reqwest client"),
            media_root,
            _media_dir: media_dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(self.url(path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(self.url(path))
    }

    /// Helper to make DELETE request
    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(self.url(path))
    }

    /// GET through a client that never stores cookies.
    pub fn get_without_cookie_store(&self, path: &str) -> reqwest::RequestBuilder {
        reqwest::Client::new().get(self.url(path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get_without_cookie_store(path).bearer_auth(token)
    }

    pub fn seed_account(&self, email: &str, role: AccountRole, digest: String) -> Account {
        let account = Account {
            id: AccountId::new(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            name: "Seeded".to_string(),
            phone: Some("+15550100".to_string()),
            role,
            password_digest: Some(digest),
            hospital: None,
            trainer_id: None,
            created_at: Utc::now(),
        };
        self.store
            .accounts
            .lock()
            .unwrap()
            .insert(account.id, account.clone());
        account
    }

    pub fn seed_hospital_admin(
        &self,
        email: &str,
        digest: String,
        contract_ends_at: Option<DateTime<Utc>>,
    ) -> Account {
        let mut account = self.seed_account(email, AccountRole::HospitalAdmin, digest);
        account.hospital = Some(HospitalAffiliation {
            hospital_id: Uuid::new_v4(),
            contract_ends_at,
        });
        self.store
            .accounts
            .lock()
            .unwrap()
            .insert(account.id, account.clone());
        account
    }

    pub fn legacy_codec(&self) -> LegacyTokenCodec {
        LegacyTokenCodec::new(LEGACY_SECRET)
    }

    /// Register then log in through the API, leaving the session cookie in
    /// the client's cookie store.
    pub async fn register_and_login(&self, email: &str, password: &str) -> serde_json::Value {
        let response = self
            .post("/api/accounts")
            .json(&serde_json::json!({
                "email_address": email,
                "name": "Pat",
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let response = self
            .post("/api/auth/login")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        response.json().await.expect("Failed to parse response")
    }
}

/// Test database helper
///
/// Each instance owns a freshly migrated database, dropped again on `Drop`.
pub struct TestDb {
    pub pool: PgPool,
    pub db_name: String,
    postgres_url: String,
}

impl TestDb {
    /// Create a new test database with a unique name.
    ///
    /// Returns `None` when `DATABASE_URL` is not set, so suites run without a
    /// Postgres server skip the database-backed tests.
    pub async fn new() -> Option<Self> {
        let Ok(postgres_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping Postgres-backed test");
            return None;
        };
        let db_name = format!(
            "test_account_service_{}",
            Uuid::new_v4().to_string().replace('-', "_")
        );

        let mut conn = PgConnection::connect(&postgres_url)
            .await
            .expect("Failed to connect to Postgres");
        conn.execute(format!(r#"CREATE DATABASE "{}";"#, db_name).as_str())
            .await
            .expect("Failed to create test database");

        let options = postgres_url
            .parse::<PgConnectOptions>()
            .expect("Failed to parse DATABASE_URL")
            .database(&db_name);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        Some(Self {
            pool,
            db_name,
            postgres_url,
        })
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        let db_name = self.db_name.clone();
        let postgres_url = self.postgres_url.clone();
        tokio::spawn(async move {
            if let Ok(mut conn) = PgConnection::connect(&postgres_url).await {
                let _ = conn
                    .execute(
                        format!(
                            r#"SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}';"#,
                            db_name
                        )
                        .as_str(),
                    )
                    .await;
                let _ = conn
                    .execute(format!(r#"DROP DATABASE IF EXISTS "{}";"#, db_name).as_str())
                    .await;
            }
        });
    }
}
