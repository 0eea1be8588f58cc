use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::account::errors::AccountError;
use crate::account::models::AccountId;
use crate::account::models::AccountUpdate;
use crate::account::ports::AccountRepository;
use crate::account::ports::MediaRecordRepository;
use crate::account::ports::MediaStore;
use crate::account::ports::MessageRepository;
use crate::account::ports::SubscriptionRepository;

/// Erasure steps, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErasureStep {
    DeactivateSubscriptions,
    DeleteMediaObjects,
    DeleteMediaRecords,
    DeleteMessages,
    AnonymizeAccount,
}

impl ErasureStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErasureStep::DeactivateSubscriptions => "deactivate_subscriptions",
            ErasureStep::DeleteMediaObjects => "delete_media_objects",
            ErasureStep::DeleteMediaRecords => "delete_media_records",
            ErasureStep::DeleteMessages => "delete_messages",
            ErasureStep::AnonymizeAccount => "anonymize_account",
        }
    }
}

impl fmt::Display for ErasureStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Completed { affected: u64 },
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: ErasureStep,
    pub status: StepStatus,
}

/// What an erasure run did, step by step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErasureReport {
    pub account_id: AccountId,
    pub steps: Vec<StepOutcome>,
}

impl ErasureReport {
    fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            steps: Vec::with_capacity(5),
        }
    }

    fn record(&mut self, step: ErasureStep, result: &Result<u64, AccountError>) {
        let status = match result {
            Ok(affected) => StepStatus::Completed {
                affected: *affected,
            },
            Err(_) => StepStatus::Failed,
        };
        self.steps.push(StepOutcome { step, status });
    }

    /// True when every step finished.
    pub fn is_complete(&self) -> bool {
        self.steps
            .iter()
            .all(|outcome| matches!(outcome.status, StepStatus::Completed { .. }))
    }

    pub fn failed_steps(&self) -> Vec<ErasureStep> {
        self.steps
            .iter()
            .filter(|outcome| outcome.status == StepStatus::Failed)
            .map(|outcome| outcome.step)
            .collect()
    }
}

/// Per-step timeout and retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPolicy {
    pub timeout: Duration,
    pub max_attempts: u32,
}

impl Default for StepPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_attempts: 3,
        }
    }
}

/// Stores touched when an account is erased.
#[derive(Clone)]
pub struct ErasureStores {
    pub accounts: Arc<dyn AccountRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub media: Arc<dyn MediaStore>,
    pub media_records: Arc<dyn MediaRecordRepository>,
    pub messages: Arc<dyn MessageRepository>,
}

/// Removes an account's data across stores, then anonymizes the account row.
///
/// Cleanup steps are best-effort: a failure is logged and recorded and the
/// next step still runs. Anonymization is the step that retires the account,
/// so its failure fails the whole erasure. Every step is safe to re-run.
pub struct AccountEraser {
    stores: ErasureStores,
    policy: StepPolicy,
}

impl AccountEraser {
    pub fn new(stores: ErasureStores, policy: StepPolicy) -> Self {
        Self { stores, policy }
    }

    /// Erase an account once the holder has typed the expected phrase.
    ///
    /// # Errors
    /// * `Validation` - Phrase missing or not equal to `expected`
    /// * see [`AccountEraser::erase`]
    pub async fn erase_confirmed(
        &self,
        id: &AccountId,
        supplied: Option<&str>,
        expected: &str,
    ) -> Result<ErasureReport, AccountError> {
        match supplied {
            None | Some("") => {
                return Err(AccountError::Validation(
                    "confirmation phrase is required".to_string(),
                ))
            }
            Some(phrase) if phrase != expected => {
                tracing::info!(account_id = %id, "Erasure confirmation phrase mismatch");
                return Err(AccountError::Validation(
                    "confirmation phrase does not match".to_string(),
                ));
            }
            Some(_) => {}
        }

        self.erase(id).await
    }

    /// Run every erasure step for `id`.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `DatabaseError` / `Timeout` - Anonymization failed after retries
    pub async fn erase(&self, id: &AccountId) -> Result<ErasureReport, AccountError> {
        tracing::info!(account_id = %id, "Account erasure started");
        let mut report = ErasureReport::new(*id);
        let stores = &self.stores;

        let result = self
            .run_step(ErasureStep::DeactivateSubscriptions, id, || {
                stores.subscriptions.deactivate_for_account(id)
            })
            .await;
        report.record(ErasureStep::DeactivateSubscriptions, &result);

        let media = &stores.media;
        let result = self
            .run_step(ErasureStep::DeleteMediaObjects, id, || async move {
                let keys = media.list_owned_objects(id).await?;
                if !keys.is_empty() {
                    media.delete_objects(&keys).await?;
                }
                Ok::<u64, AccountError>(keys.len() as u64)
            })
            .await;
        report.record(ErasureStep::DeleteMediaObjects, &result);

        let result = self
            .run_step(ErasureStep::DeleteMediaRecords, id, || {
                stores.media_records.delete_by_account(id)
            })
            .await;
        report.record(ErasureStep::DeleteMediaRecords, &result);

        let result = self
            .run_step(ErasureStep::DeleteMessages, id, || {
                stores.messages.delete_involving(id)
            })
            .await;
        report.record(ErasureStep::DeleteMessages, &result);

        let result = self
            .run_step(ErasureStep::AnonymizeAccount, id, || async move {
                stores
                    .accounts
                    .update_fields(id, AccountUpdate::anonymize(id))
                    .await
                    .map(|_| 1)
            })
            .await;
        report.record(ErasureStep::AnonymizeAccount, &result);
        result?;

        if report.is_complete() {
            tracing::info!(account_id = %id, "Account erasure completed");
        } else {
            tracing::warn!(
                account_id = %id,
                failed_steps = ?report.failed_steps(),
                "Account erasure completed with failed cleanup steps"
            );
        }

        Ok(report)
    }

    async fn run_step<F, Fut, E>(
        &self,
        step: ErasureStep,
        id: &AccountId,
        operation: F,
    ) -> Result<u64, AccountError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<u64, E>>,
        E: Into<AccountError>,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match tokio::time::timeout(self.policy.timeout, operation()).await {
                Ok(Ok(affected)) => {
                    tracing::debug!(account_id = %id, %step, affected, "Erasure step finished");
                    return Ok(affected);
                }
                Ok(Err(e)) => e.into(),
                Err(_) => AccountError::Timeout(format!(
                    "{} exceeded {}ms",
                    step,
                    self.policy.timeout.as_millis()
                )),
            };

            if attempt >= self.policy.max_attempts || !error.is_transient() {
                tracing::error!(
                    account_id = %id,
                    %step,
                    attempt,
                    error = %error,
                    "Erasure step failed"
                );
                return Err(error);
            }

            tracing::warn!(
                account_id = %id,
                %step,
                attempt,
                error = %error,
                "Erasure step failed, retrying"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;
    use std::sync::atomic::Ordering;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use mockall::mock;
    use mockall::Sequence;

    use super::*;
    use crate::account::errors::StorageError;
    use crate::account::models::Account;
    use crate::account::models::AccountRole;
    use crate::account::models::EmailAddress;

    mock! {
        pub TestAccountRepository {}

        #[async_trait]
        impl AccountRepository for TestAccountRepository {
            async fn insert(&self, account: Account) -> Result<Account, AccountError>;
            async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError>;
            async fn find_by_identifier(&self, email: &EmailAddress) -> Result<Option<Account>, AccountError>;
            async fn update_fields(&self, id: &AccountId, update: AccountUpdate) -> Result<(), AccountError>;
        }
    }

    mock! {
        pub TestSubscriptionRepository {}

        #[async_trait]
        impl SubscriptionRepository for TestSubscriptionRepository {
            async fn deactivate_for_account(&self, id: &AccountId) -> Result<u64, AccountError>;
        }
    }

    mock! {
        pub TestMediaStore {}

        #[async_trait]
        impl MediaStore for TestMediaStore {
            async fn list_owned_objects(&self, id: &AccountId) -> Result<Vec<String>, StorageError>;
            async fn delete_objects(&self, keys: &[String]) -> Result<(), StorageError>;
        }
    }

    mock! {
        pub TestMediaRecordRepository {}

        #[async_trait]
        impl MediaRecordRepository for TestMediaRecordRepository {
            async fn delete_by_account(&self, id: &AccountId) -> Result<u64, AccountError>;
        }
    }

    mock! {
        pub TestMessageRepository {}

        #[async_trait]
        impl MessageRepository for TestMessageRepository {
            async fn delete_involving(&self, id: &AccountId) -> Result<u64, AccountError>;
        }
    }

    struct Mocks {
        accounts: MockTestAccountRepository,
        subscriptions: MockTestSubscriptionRepository,
        media: MockTestMediaStore,
        media_records: MockTestMediaRecordRepository,
        messages: MockTestMessageRepository,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                accounts: MockTestAccountRepository::new(),
                subscriptions: MockTestSubscriptionRepository::new(),
                media: MockTestMediaStore::new(),
                media_records: MockTestMediaRecordRepository::new(),
                messages: MockTestMessageRepository::new(),
            }
        }

        /// Every step succeeds unless overridden before this call.
        fn succeeding() -> Self {
            let mut mocks = Self::new();
            mocks.subscriptions.expect_deactivate_for_account().returning(|_| Ok(1));
            mocks
                .media
                .expect_list_owned_objects()
                .returning(|id| Ok(vec![format!("{}/avatar.png", id)]));
            mocks.media.expect_delete_objects().returning(|_| Ok(()));
            mocks.media_records.expect_delete_by_account().returning(|_| Ok(1));
            mocks.messages.expect_delete_involving().returning(|_| Ok(4));
            mocks.accounts.expect_update_fields().returning(|_, _| Ok(()));
            mocks
        }

        fn into_eraser(self) -> AccountEraser {
            self.into_eraser_with(StepPolicy {
                timeout: Duration::from_secs(1),
                max_attempts: 2,
            })
        }

        fn into_eraser_with(self, policy: StepPolicy) -> AccountEraser {
            AccountEraser::new(
                ErasureStores {
                    accounts: Arc::new(self.accounts),
                    subscriptions: Arc::new(self.subscriptions),
                    media: Arc::new(self.media),
                    media_records: Arc::new(self.media_records),
                    messages: Arc::new(self.messages),
                },
                policy,
            )
        }
    }

    #[tokio::test]
    async fn test_erase_runs_steps_in_order() {
        let mut mocks = Mocks::new();
        let mut sequence = Sequence::new();
        let id = AccountId::new();

        mocks
            .subscriptions
            .expect_deactivate_for_account()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(2));
        mocks
            .media
            .expect_list_owned_objects()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|id| Ok(vec![format!("{}/a.jpg", id), format!("{}/b.jpg", id)]));
        mocks
            .media
            .expect_delete_objects()
            .withf(|keys| keys.len() == 2)
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(()));
        mocks
            .media_records
            .expect_delete_by_account()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(2));
        mocks
            .messages
            .expect_delete_involving()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(7));
        mocks
            .accounts
            .expect_update_fields()
            .withf(move |target, update| {
                *target == id
                    && update.role == Some(AccountRole::Withdrawn)
                    && update.password_digest == Some(None)
                    && update.email == Some(EmailAddress::withdrawn_placeholder(&id))
            })
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _| Ok(()));

        let report = mocks.into_eraser().erase(&id).await.unwrap();

        assert!(report.is_complete());
        assert_eq!(
            report.steps.iter().map(|s| s.step).collect::<Vec<_>>(),
            vec![
                ErasureStep::DeactivateSubscriptions,
                ErasureStep::DeleteMediaObjects,
                ErasureStep::DeleteMediaRecords,
                ErasureStep::DeleteMessages,
                ErasureStep::AnonymizeAccount,
            ]
        );
        assert_eq!(
            report.steps[3].status,
            StepStatus::Completed { affected: 7 }
        );
    }

    #[tokio::test]
    async fn test_empty_media_skips_delete() {
        let mut mocks = Mocks::new();
        mocks.subscriptions.expect_deactivate_for_account().returning(|_| Ok(0));
        mocks.media.expect_list_owned_objects().returning(|_| Ok(vec![]));
        mocks.media.expect_delete_objects().times(0);
        mocks.media_records.expect_delete_by_account().returning(|_| Ok(0));
        mocks.messages.expect_delete_involving().returning(|_| Ok(0));
        mocks.accounts.expect_update_fields().returning(|_, _| Ok(()));

        let report = mocks.into_eraser().erase(&AccountId::new()).await.unwrap();
        assert_eq!(
            report.steps[1].status,
            StepStatus::Completed { affected: 0 }
        );
    }

    #[tokio::test]
    async fn test_cleanup_failure_does_not_abort() {
        let mut mocks = Mocks::new();
        mocks
            .subscriptions
            .expect_deactivate_for_account()
            .returning(|_| Err(AccountError::Validation("bad state".to_string())));
        mocks
            .media
            .expect_list_owned_objects()
            .returning(|_| Err(StorageError::InvalidPath("..".to_string())));
        mocks.media_records.expect_delete_by_account().times(1).returning(|_| Ok(1));
        mocks.messages.expect_delete_involving().times(1).returning(|_| Ok(1));
        mocks.accounts.expect_update_fields().times(1).returning(|_, _| Ok(()));

        let report = mocks.into_eraser().erase(&AccountId::new()).await.unwrap();

        assert!(!report.is_complete());
        assert_eq!(
            report.failed_steps(),
            vec![
                ErasureStep::DeactivateSubscriptions,
                ErasureStep::DeleteMediaObjects
            ]
        );
    }

    #[tokio::test]
    async fn test_anonymize_failure_fails_erasure() {
        let mut mocks = Mocks::new();
        mocks.subscriptions.expect_deactivate_for_account().returning(|_| Ok(0));
        mocks.media.expect_list_owned_objects().returning(|_| Ok(vec![]));
        mocks.media_records.expect_delete_by_account().returning(|_| Ok(0));
        mocks.messages.expect_delete_involving().returning(|_| Ok(0));
        mocks
            .accounts
            .expect_update_fields()
            .times(2)
            .returning(|_, _| Err(AccountError::DatabaseError("deadlock".to_string())));

        let result = mocks.into_eraser().erase(&AccountId::new()).await;
        assert!(matches!(result, Err(AccountError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn test_missing_account_is_not_found() {
        let mut mocks = Mocks::new();
        mocks.subscriptions.expect_deactivate_for_account().returning(|_| Ok(0));
        mocks.media.expect_list_owned_objects().returning(|_| Ok(vec![]));
        mocks.media_records.expect_delete_by_account().returning(|_| Ok(0));
        mocks.messages.expect_delete_involving().returning(|_| Ok(0));
        mocks
            .accounts
            .expect_update_fields()
            .times(1)
            .returning(|id, _| Err(AccountError::NotFound(id.to_string())));

        let result = mocks.into_eraser().erase(&AccountId::new()).await;
        assert!(matches!(result, Err(AccountError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let mut mocks = Mocks::succeeding();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        mocks.messages = MockTestMessageRepository::new();
        mocks.messages.expect_delete_involving().times(2).returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AccountError::DatabaseError("connection reset".to_string()))
            } else {
                Ok(3)
            }
        });

        let report = mocks.into_eraser().erase(&AccountId::new()).await.unwrap();

        assert!(report.is_complete());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let mut mocks = Mocks::succeeding();
        mocks.media_records = MockTestMediaRecordRepository::new();
        mocks
            .media_records
            .expect_delete_by_account()
            .times(1)
            .returning(|_| Err(AccountError::Validation("rejected".to_string())));

        let report = mocks.into_eraser().erase(&AccountId::new()).await.unwrap();
        assert_eq!(report.failed_steps(), vec![ErasureStep::DeleteMediaRecords]);
    }

    struct StalledMediaStore {
        attempts: Mutex<u32>,
    }

    #[async_trait]
    impl MediaStore for StalledMediaStore {
        async fn list_owned_objects(&self, _id: &AccountId) -> Result<Vec<String>, StorageError> {
            *self.attempts.lock().unwrap() += 1;
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![])
        }

        async fn delete_objects(&self, _keys: &[String]) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_stalled_step_times_out_and_erasure_continues() {
        let mocks = Mocks::succeeding();
        let stalled = Arc::new(StalledMediaStore {
            attempts: Mutex::new(0),
        });
        let eraser = AccountEraser::new(
            ErasureStores {
                accounts: Arc::new(mocks.accounts),
                subscriptions: Arc::new(mocks.subscriptions),
                media: stalled.clone(),
                media_records: Arc::new(mocks.media_records),
                messages: Arc::new(mocks.messages),
            },
            StepPolicy {
                timeout: Duration::from_millis(20),
                max_attempts: 2,
            },
        );

        let report = eraser.erase(&AccountId::new()).await.unwrap();

        assert_eq!(report.failed_steps(), vec![ErasureStep::DeleteMediaObjects]);
        assert_eq!(*stalled.attempts.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_confirmation_phrase_required() {
        let mut mocks = Mocks::new();
        mocks.accounts.expect_update_fields().times(0);
        let eraser = mocks.into_eraser();
        let id = AccountId::new();

        for supplied in [
            None,
            Some(""),
            Some("   "),
            Some("delete me"),
            Some("   erase my account\n"),
            Some("Erase my account"),
        ] {
            let result = eraser.erase_confirmed(&id, supplied, "erase my account").await;
            assert!(matches!(result, Err(AccountError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_confirmed_erasure_runs() {
        let eraser = Mocks::succeeding().into_eraser();

        let report = eraser
            .erase_confirmed(&AccountId::new(), Some("erase my account"), "erase my account")
            .await
            .unwrap();
        assert!(report.is_complete());
    }
}
