pub mod account;
pub mod media_record;
pub mod message;
pub mod subscription;

pub use account::PostgresAccountRepository;
pub use media_record::PostgresMediaRecordRepository;
pub use message::PostgresMessageRepository;
pub use subscription::PostgresSubscriptionRepository;
