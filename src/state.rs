use std::sync::Arc;

use axum::extract::FromRef;
use time::Duration;
use tracing::{info, warn};

use crate::{
    auth::{
        jwt::{JwtCodec, TokenCodec},
        password::Argon2Hasher,
        services::{Authenticator, SessionValidator},
    },
    config::AppConfig,
    logs::services::PresenceEngine,
    store::{MemoryStore, PgStore, Store},
    users::services::CredentialStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub credentials: CredentialStore,
    pub authenticator: Authenticator,
    pub sessions: SessionValidator,
    pub presence: PresenceEngine,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn Store> = match &config.database_url {
            Some(url) => {
                let pg = PgStore::connect(url).await?;
                pg.migrate().await;
                info!("using postgres store");
                Arc::new(pg)
            }
            None => {
                warn!("DATABASE_URL not set; using in-memory store, data is lost on exit");
                Arc::new(MemoryStore::new())
            }
        };
        Ok(Self::from_parts(Arc::new(config), store))
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn Store>) -> Self {
        let codec: Arc<dyn TokenCodec> = Arc::new(JwtCodec::from_config(&config.jwt));
        let credentials = CredentialStore::new(store.clone(), Arc::new(Argon2Hasher));
        let ttl = Duration::minutes(config.jwt.ttl_minutes);

        Self {
            authenticator: Authenticator::new(credentials.clone(), codec.clone(), ttl),
            sessions: SessionValidator::new(credentials.clone(), codec),
            presence: PresenceEngine::new(store),
            credentials,
            config,
        }
    }
}

impl FromRef<AppState> for SessionValidator {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}
