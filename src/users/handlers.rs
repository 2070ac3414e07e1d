use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{instrument, warn};

use crate::{
    auth::extractors::CurrentUser,
    error::AppError,
    state::AppState,
    users::dto::{ListUsersQuery, UpdateProfileRequest, UserResponse},
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/me", get(get_me).put(update_me))
}

fn validate_update(req: &UpdateProfileRequest) -> Result<(), AppError> {
    lazy_static! {
        static ref COLOR_RE: Regex = Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();
    }
    if let Some(color) = &req.color_code {
        if !COLOR_RE.is_match(color) {
            warn!(color = %color, "invalid color code");
            return Err(AppError::Validation("color_code must look like #RRGGBB".into()));
        }
    }
    if req.nfc_card_id.as_deref().is_some_and(|c| c.trim().is_empty()) {
        return Err(AppError::Validation("nfc_card_id must not be empty".into()));
    }
    Ok(())
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user.into())
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    validate_update(&payload)?;
    let updated = state
        .credentials
        .update_profile(&user, &payload.into())
        .await?;
    Ok(Json(updated.into()))
}

#[instrument(skip(state, _caller))]
pub async fn list_users(
    State(state): State<AppState>,
    _caller: CurrentUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state.credentials.list_users(query.status).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
