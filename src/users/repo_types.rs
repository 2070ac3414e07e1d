use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

pub const DEFAULT_COLOR_CODE: &str = "#3b82f6";

/// Presence state of a user. Only changed as a side effect of recorded actions.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    In,
    #[default]
    Out,
    Away,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::In => "in",
            Status::Out => "out",
            Status::Away => "away",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Master,
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Master => "master",
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} value {value:?}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl FromStr for Status {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Status::In),
            "out" => Ok(Status::Out),
            "away" => Ok(Status::Away),
            other => Err(UnknownVariant {
                kind: "status",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "master" => Ok(Role::Master),
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String, // Argon2 PHC string, never serialized
    pub original_id: Option<String>,
    pub display_name: Option<String>,
    pub role: Role,
    pub status: Status,
    pub color_code: String,
    pub nfc_card_id: Option<String>,
    pub is_deleted: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Raw `users` row; enum columns are stored as text.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub original_id: Option<String>,
    pub display_name: Option<String>,
    pub role: String,
    pub status: String,
    pub color_code: String,
    pub nfc_card_id: Option<String>,
    pub is_deleted: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = UnknownVariant;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            email: r.email,
            password_hash: r.password_hash,
            original_id: r.original_id,
            display_name: r.display_name,
            role: r.role.parse()?,
            status: r.status.parse()?,
            color_code: r.color_code,
            nfc_card_id: r.nfc_card_id,
            is_deleted: r.is_deleted,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Values needed to insert a user; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub original_id: Option<String>,
}

/// Partial profile update. `None` means "leave as is".
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub original_id: Option<String>,
    pub role: Option<Role>,
    pub color_code: Option<String>,
    pub nfc_card_id: Option<String>,
    pub is_deleted: Option<bool>,
}

impl ProfileUpdate {
    /// Copies the present fields onto `user`. Does not touch `updated_at`.
    pub fn apply(&self, user: &mut User) {
        if let Some(v) = &self.display_name {
            user.display_name = Some(v.clone());
        }
        if let Some(v) = &self.original_id {
            user.original_id = Some(v.clone());
        }
        if let Some(v) = self.role {
            user.role = v;
        }
        if let Some(v) = &self.color_code {
            user.color_code = v.clone();
        }
        if let Some(v) = &self.nfc_card_id {
            user.nfc_card_id = Some(v.clone());
        }
        if let Some(v) = self.is_deleted {
            user.is_deleted = v;
        }
    }
}
