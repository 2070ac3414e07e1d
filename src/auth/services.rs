use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, instrument, warn};

use crate::{
    auth::{claims::Claims, jwt::TokenCodec},
    error::AppError,
    users::{repo_types::User, services::CredentialStore},
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Verifies credentials and issues session tokens.
#[derive(Clone)]
pub struct Authenticator {
    credentials: CredentialStore,
    codec: Arc<dyn TokenCodec>,
    ttl: Duration,
}

impl Authenticator {
    pub fn new(credentials: CredentialStore, codec: Arc<dyn TokenCodec>, ttl: Duration) -> Self {
        Self {
            credentials,
            codec,
            ttl,
        }
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: Option<String>,
        original_id: Option<String>,
    ) -> Result<User, AppError> {
        self.credentials
            .create(email, password, display_name, original_id)
            .await
    }

    /// Every rejection is `InvalidCredentials`; the reason only goes to the log.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError> {
        let Some(user) = self.credentials.find_by_email(email).await? else {
            warn!(email, "login unknown email");
            return Err(AppError::InvalidCredentials);
        };

        if !self.credentials.hasher().verify(password, &user.password_hash)? {
            warn!(email, user_id = user.id, "login invalid password");
            return Err(AppError::InvalidCredentials);
        }

        if user.is_deleted {
            warn!(email, user_id = user.id, "login by deleted user");
            return Err(AppError::InvalidCredentials);
        }

        info!(user_id = user.id, "user logged in");
        Ok(user)
    }

    pub fn issue_token(&self, user: &User) -> Result<String, AppError> {
        self.issue_token_at(user, OffsetDateTime::now_utc())
    }

    fn issue_token_at(&self, user: &User, now: OffsetDateTime) -> Result<String, AppError> {
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            iat: now.unix_timestamp(),
            exp: (now + self.ttl).unix_timestamp(),
        };
        self.codec
            .encode(&claims)
            .map_err(|e| AppError::Internal(e.into()))
    }
}

/// Resolves a bearer token to a live user record.
#[derive(Clone)]
pub struct SessionValidator {
    credentials: CredentialStore,
    codec: Arc<dyn TokenCodec>,
}

impl SessionValidator {
    pub fn new(credentials: CredentialStore, codec: Arc<dyn TokenCodec>) -> Self {
        Self { credentials, codec }
    }

    #[instrument(skip_all)]
    pub async fn resolve(&self, token: &str) -> Result<User, AppError> {
        let claims = self.codec.decode(token).map_err(|e| {
            debug!(error = %e, "token rejected");
            AppError::InvalidToken
        })?;

        match self.credentials.find_by_id(claims.sub).await? {
            Some(user) if !user.is_deleted => Ok(user),
            Some(_) => {
                warn!(user_id = claims.sub, "token for deleted user");
                Err(AppError::UserNotFound)
            }
            None => {
                warn!(user_id = claims.sub, "token subject missing");
                Err(AppError::UserNotFound)
            }
        }
    }
}
