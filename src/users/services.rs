use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::{
    auth::password::PasswordHasher,
    error::AppError,
    store::{Store, StoreError},
    users::repo_types::{NewUser, ProfileUpdate, Status, User},
};

/// User records on top of the store. Plaintext passwords stop here.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn Store>,
    hasher: Arc<dyn PasswordHasher>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn Store>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.store.find_user_by_email(email).await?)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.store.find_user_by_id(id).await?)
    }

    #[instrument(skip(self, password))]
    pub async fn create(
        &self,
        email: &str,
        password: &str,
        display_name: Option<String>,
        original_id: Option<String>,
    ) -> Result<User, AppError> {
        if self.store.find_user_by_email(email).await?.is_some() {
            warn!(email, "email already registered");
            return Err(AppError::DuplicateEmail);
        }

        let password_hash = self.hasher.hash(password)?;
        // A concurrent registration can still win the race; the unique
        // constraint reports it as DuplicateEmail.
        let user = self
            .store
            .insert_user(NewUser {
                email: email.to_string(),
                password_hash,
                display_name,
                original_id,
            })
            .await?;

        info!(user_id = user.id, email = %user.email, "user registered");
        Ok(user)
    }

    pub async fn list_users(&self, status: Option<Status>) -> Result<Vec<User>, AppError> {
        Ok(self.store.list_users(status).await?)
    }

    #[instrument(skip(self, user, update), fields(user_id = user.id))]
    pub async fn update_profile(
        &self,
        user: &User,
        update: &ProfileUpdate,
    ) -> Result<User, AppError> {
        match self.store.update_user(user.id, update).await {
            Ok(u) => Ok(u),
            Err(StoreError::DuplicateCardId) => {
                warn!("nfc card already registered to another user");
                Err(AppError::DuplicateCardId)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn hasher(&self) -> &dyn PasswordHasher {
        self.hasher.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::password::Argon2Hasher, store::MemoryStore, users::repo_types::Role};

    fn credentials() -> CredentialStore {
        CredentialStore::new(Arc::new(MemoryStore::new()), Arc::new(Argon2Hasher))
    }

    #[tokio::test]
    async fn create_hashes_password() {
        let creds = credentials();
        let u = creds.create("a@x.com", "pw1", None, None).await.unwrap();
        assert_ne!(u.password_hash, "pw1");
        assert!(creds.hasher().verify("pw1", &u.password_hash).unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_leaves_first_user_unchanged() {
        let creds = credentials();
        let first = creds
            .create("a@x.com", "pw1", Some("First".into()), None)
            .await
            .unwrap();
        let err = creds
            .create("a@x.com", "other", Some("Second".into()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));

        let stored = creds.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(stored, first);
        assert_eq!(creds.list_users(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_with_only_display_name_keeps_everything_else() {
        let creds = credentials();
        let u = creds
            .create("a@x.com", "pw1", None, Some("S-17".into()))
            .await
            .unwrap();
        let u = creds
            .update_profile(
                &u,
                &ProfileUpdate {
                    color_code: Some("#ff0000".into()),
                    nfc_card_id: Some("CARD-1".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = creds
            .update_profile(
                &u,
                &ProfileUpdate {
                    display_name: Some("Aki".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.display_name.as_deref(), Some("Aki"));
        assert_eq!(updated.color_code, "#ff0000");
        assert_eq!(updated.nfc_card_id.as_deref(), Some("CARD-1"));
        assert_eq!(updated.original_id.as_deref(), Some("S-17"));
        assert_eq!(updated.role, Role::User);
        assert_eq!(updated.email, u.email);
        assert_eq!(updated.status, u.status);
        assert_eq!(updated.created_at, u.created_at);
        assert!(updated.updated_at >= u.updated_at);
    }

    #[tokio::test]
    async fn list_users_filters_by_exact_status_and_keeps_deleted() {
        let creds = credentials();
        let a = creds.create("a@x.com", "pw", None, None).await.unwrap();
        creds.create("b@x.com", "pw", None, None).await.unwrap();
        creds
            .update_profile(
                &a,
                &ProfileUpdate {
                    is_deleted: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let all = creds.list_users(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|u| u.is_deleted));

        assert_eq!(creds.list_users(Some(Status::Out)).await.unwrap().len(), 2);
        assert!(creds.list_users(Some(Status::In)).await.unwrap().is_empty());
    }
}
