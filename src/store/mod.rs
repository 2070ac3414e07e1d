//! Persistence seam shared by the credential store and the presence engine.

use async_trait::async_trait;

use crate::{
    logs::repo_types::{Log, NewLog},
    users::repo_types::{NewUser, ProfileUpdate, Status, User},
};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already in use")]
    DuplicateEmail,
    #[error("nfc card id already registered")]
    DuplicateCardId,
    #[error("user {0} not found")]
    UserNotFound(i64),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>>;
    async fn insert_user(&self, new: NewUser) -> StoreResult<User>;
    async fn list_users(&self, status: Option<Status>) -> StoreResult<Vec<User>>;
    async fn update_user(&self, id: i64, update: &ProfileUpdate) -> StoreResult<User>;

    /// Insert a log for `owner_id` and, if `status` is set, move the owner to it.
    /// Both writes commit together or not at all.
    async fn record_action(
        &self,
        owner_id: i64,
        new: NewLog,
        status: Option<Status>,
    ) -> StoreResult<Log>;

    async fn list_logs(&self, owner_id: i64) -> StoreResult<Vec<Log>>;
}
