use serde::Deserialize;

/// Body of `POST /users/me/logs`.
#[derive(Debug, Deserialize)]
pub struct CreateLogRequest {
    pub action: String,
    pub place: Option<String>,
    pub note: Option<String>,
}
