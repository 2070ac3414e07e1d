use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::{Store, StoreError, StoreResult};
use crate::{
    logs::repo_types::{Log, NewLog},
    users::repo_types::{NewUser, ProfileUpdate, Role, Status, User, DEFAULT_COLOR_CODE},
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    logs: Vec<Log>,
    next_user_id: i64,
    next_log_id: i64,
}

impl Tables {
    fn user_mut(&mut self, id: i64) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    fn card_taken(&self, card: &str, except: i64) -> bool {
        self.users
            .iter()
            .any(|u| u.id != except && u.nfc_card_id.as_deref() == Some(card))
    }
}

/// Process-local store with the same constraints as the `users`/`logs` schema.
/// Both tables sit behind one lock, so `record_action` is applied as a unit.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_user(&self, new: NewUser) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        if t.users.iter().any(|u| u.email == new.email) {
            return Err(StoreError::DuplicateEmail);
        }
        t.next_user_id += 1;
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: t.next_user_id,
            email: new.email,
            password_hash: new.password_hash,
            original_id: new.original_id,
            display_name: new.display_name,
            role: Role::default(),
            status: Status::default(),
            color_code: DEFAULT_COLOR_CODE.to_string(),
            nfc_card_id: None,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn list_users(&self, status: Option<Status>) -> StoreResult<Vec<User>> {
        let t = self.tables.read().await;
        Ok(t.users
            .iter()
            .filter(|u| status.map_or(true, |s| u.status == s))
            .cloned()
            .collect())
    }

    async fn update_user(&self, id: i64, update: &ProfileUpdate) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        if let Some(card) = &update.nfc_card_id {
            if t.card_taken(card, id) {
                return Err(StoreError::DuplicateCardId);
            }
        }
        let user = t.user_mut(id).ok_or(StoreError::UserNotFound(id))?;
        update.apply(user);
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.clone())
    }

    async fn record_action(
        &self,
        owner_id: i64,
        new: NewLog,
        status: Option<Status>,
    ) -> StoreResult<Log> {
        let mut t = self.tables.write().await;
        let now = OffsetDateTime::now_utc();

        let owner = t.user_mut(owner_id).ok_or(StoreError::UserNotFound(owner_id))?;
        if let Some(status) = status {
            owner.status = status;
            owner.updated_at = now;
        }

        t.next_log_id += 1;
        let log = Log {
            id: t.next_log_id,
            owner_id,
            action: new.action,
            place: new.place,
            note: new.note,
            created_at: now,
            updated_at: now,
        };
        t.logs.push(log.clone());
        Ok(log)
    }

    async fn list_logs(&self, owner_id: i64) -> StoreResult<Vec<Log>> {
        let t = self.tables.read().await;
        Ok(t.logs
            .iter()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect())
    }
}
