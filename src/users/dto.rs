use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::users::repo_types::{ProfileUpdate, Role, Status, User};

/// Public profile returned to clients; never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub display_name: Option<String>,
    pub original_id: Option<String>,
    pub role: Role,
    pub color_code: String,
    pub nfc_card_id: Option<String>,
    pub status: Status,
    pub is_deleted: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub date_created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub date_last_updated: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            display_name: u.display_name,
            original_id: u.original_id,
            role: u.role,
            color_code: u.color_code,
            nfc_card_id: u.nfc_card_id,
            status: u.status,
            is_deleted: u.is_deleted,
            date_created: u.created_at,
            date_last_updated: u.updated_at,
        }
    }
}

/// Body of `PUT /users/me`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub original_id: Option<String>,
    pub role: Option<Role>,
    pub color_code: Option<String>,
    pub nfc_card_id: Option<String>,
    pub is_deleted: Option<bool>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(r: UpdateProfileRequest) -> Self {
        Self {
            display_name: r.display_name,
            original_id: r.original_id,
            role: r.role,
            color_code: r.color_code,
            nfc_card_id: r.nfc_card_id,
            is_deleted: r.is_deleted,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub status: Option<Status>,
}
