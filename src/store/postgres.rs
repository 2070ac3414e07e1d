use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{debug, instrument, warn};

use super::{Store, StoreError, StoreResult};
use crate::{
    logs::repo_types::{Log, NewLog},
    users::repo_types::{NewUser, ProfileUpdate, Status, User},
};

const EMAIL_CONSTRAINT: &str = "users_email_key";
const CARD_CONSTRAINT: &str = "users_nfc_card_id_key";

/// Classify unique and foreign key violations; everything else stays a database error.
fn map_db_error(e: sqlx::Error, owner_id: Option<i64>) -> StoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some(EMAIL_CONSTRAINT) => return StoreError::DuplicateEmail,
                Some(CARD_CONSTRAINT) => return StoreError::DuplicateCardId,
                _ => {}
            }
        }
        if db_err.is_foreign_key_violation() {
            if let Some(id) = owner_id {
                return StoreError::UserNotFound(id);
            }
        }
    }
    StoreError::Database(e)
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool })
    }

    /// Run embedded migrations. A failure is logged and tolerated, since the
    /// schema may be managed outside the service.
    pub async fn migrate(&self) {
        if let Err(e) = sqlx::migrate!("./migrations").run(&self.pool).await {
            warn!(error = %e, "migration failed; continuing");
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    #[instrument(skip(self, new), fields(email = %new.email))]
    async fn insert_user(&self, new: NewUser) -> StoreResult<User> {
        User::create(&self.pool, &new)
            .await
            .map_err(|e| map_db_error(e, None))
    }

    async fn list_users(&self, status: Option<Status>) -> StoreResult<Vec<User>> {
        Ok(User::list(&self.pool, status).await?)
    }

    #[instrument(skip(self, update))]
    async fn update_user(&self, id: i64, update: &ProfileUpdate) -> StoreResult<User> {
        User::update_profile(&self.pool, id, update)
            .await
            .map_err(|e| map_db_error(e, None))?
            .ok_or(StoreError::UserNotFound(id))
    }

    #[instrument(skip(self, new), fields(action = %new.action))]
    async fn record_action(
        &self,
        owner_id: i64,
        new: NewLog,
        status: Option<Status>,
    ) -> StoreResult<Log> {
        // Dropping `tx` on any early return rolls both writes back.
        let mut tx = self.pool.begin().await?;

        let log = Log::insert(&mut *tx, owner_id, &new)
            .await
            .map_err(|e| map_db_error(e, Some(owner_id)))?;

        if let Some(status) = status {
            let touched = User::set_status(&mut *tx, owner_id, status).await?;
            if touched == 0 {
                return Err(StoreError::UserNotFound(owner_id));
            }
        }

        tx.commit().await?;
        debug!(log_id = log.id, owner_id, ?status, "action recorded");
        Ok(log)
    }

    async fn list_logs(&self, owner_id: i64) -> StoreResult<Vec<Log>> {
        Ok(Log::list_by_owner(&self.pool, owner_id).await?)
    }
}
