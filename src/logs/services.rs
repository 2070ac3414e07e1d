use std::sync::Arc;

use tracing::{info, instrument};

use crate::{
    error::AppError,
    logs::repo_types::{Log, NewLog},
    store::Store,
    users::repo_types::{Status, User},
};

/// Status an action moves its owner to. Matching is exact and case-sensitive;
/// any other action is recorded without touching the status.
pub fn status_for_action(action: &str) -> Option<Status> {
    match action {
        "enter" | "return" => Some(Status::In),
        "exit" => Some(Status::Out),
        "go_out" => Some(Status::Away),
        _ => None,
    }
}

/// Appends action logs and keeps each user's status in step with them.
#[derive(Clone)]
pub struct PresenceEngine {
    store: Arc<dyn Store>,
}

impl PresenceEngine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, user, place, note), fields(user_id = user.id))]
    pub async fn record_action(
        &self,
        user: &User,
        action: &str,
        place: Option<String>,
        note: Option<String>,
    ) -> Result<Log, AppError> {
        let status = status_for_action(action);
        let log = self
            .store
            .record_action(
                user.id,
                NewLog {
                    action: action.to_string(),
                    place,
                    note,
                },
                status,
            )
            .await?;

        info!(
            log_id = log.id,
            from = %user.status,
            to = %status.unwrap_or(user.status),
            "action recorded"
        );
        Ok(log)
    }

    pub async fn list_logs_for_user(&self, user: &User) -> Result<Vec<Log>, AppError> {
        Ok(self.store.list_logs(user.id).await?)
    }
}
