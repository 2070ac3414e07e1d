use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// One recorded action. Append-only: never updated or deleted by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Log {
    pub id: i64,
    pub owner_id: i64,
    pub action: String,
    pub place: Option<String>,
    pub note: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewLog {
    pub action: String,
    pub place: Option<String>,
    pub note: Option<String>,
}
