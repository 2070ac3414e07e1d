use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::instrument;

use crate::{
    auth::extractors::CurrentUser,
    error::AppError,
    logs::{dto::CreateLogRequest, repo_types::Log},
    state::AppState,
};

pub fn log_routes() -> Router<AppState> {
    Router::new().route("/users/me/logs", get(list_logs).post(create_log))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id, action = %payload.action))]
pub async fn create_log(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateLogRequest>,
) -> Result<(StatusCode, Json<Log>), AppError> {
    if payload.action.is_empty() {
        return Err(AppError::Validation("action must not be empty".into()));
    }
    let log = state
        .presence
        .record_action(&user, &payload.action, payload.place, payload.note)
        .await?;
    Ok((StatusCode::CREATED, Json(log)))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn list_logs(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Log>>, AppError> {
    Ok(Json(state.presence.list_logs_for_user(&user).await?))
}
