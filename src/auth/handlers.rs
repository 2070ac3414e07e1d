use axum::{extract::State, routing::post, Form, Json, Router};
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{RegisterRequest, TokenForm, TokenResponse},
        services::is_valid_email,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/token", post(token))
}

pub(crate) fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }
    Ok(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let email = normalize_email(&payload.email)?;
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }

    let user = state
        .authenticator
        .register(
            &email,
            &payload.password,
            payload.display_name,
            payload.original_id,
        )
        .await?;

    let token = state.authenticator.issue_token(&user)?;
    Ok(Json(TokenResponse::bearer(token)))
}

#[instrument(skip(state, form))]
pub async fn token(
    State(state): State<AppState>,
    Form(form): Form<TokenForm>,
) -> Result<Json<TokenResponse>, AppError> {
    // A malformed email cannot match any account; answer like any other miss.
    let email = normalize_email(&form.username).map_err(|_| AppError::InvalidCredentials)?;

    let user = state.authenticator.authenticate(&email, &form.password).await?;
    let token = state.authenticator.issue_token(&user)?;
    Ok(Json(TokenResponse::bearer(token)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  A@X.Com ").unwrap(), "a@x.com");
        assert!(matches!(
            normalize_email("not-an-email"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn token_response_serialization() {
        let json = serde_json::to_value(TokenResponse::bearer("abc".into())).unwrap();
        assert_eq!(json["access_token"], "abc");
        assert_eq!(json["token_type"], "bearer");
    }
}
