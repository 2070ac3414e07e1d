use sqlx::PgExecutor;

use crate::users::repo_types::{NewUser, ProfileUpdate, Role, Status, User, UserRow};

const USER_COLUMNS: &str = "id, email, password_hash, original_id, display_name, role, status, \
                            color_code, nfc_card_id, is_deleted, created_at, updated_at";

fn decode(row: UserRow) -> Result<User, sqlx::Error> {
    User::try_from(row).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

impl User {
    /// Find a user by exact email.
    pub async fn find_by_email<'e, E: PgExecutor<'e>>(
        db: E,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?
        .map(decode)
        .transpose()
    }

    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        db: E,
        id: i64,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .map(decode)
            .transpose()
    }

    /// Insert a new user; role, status and color come from column defaults.
    pub async fn create<'e, E: PgExecutor<'e>>(db: E, new: &NewUser) -> Result<User, sqlx::Error> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (email, password_hash, display_name, original_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.display_name.as_deref())
        .bind(new.original_id.as_deref())
        .fetch_one(db)
        .await?;
        decode(row)
    }

    /// All users, or only those with the given status. Logically deleted users are included.
    pub async fn list<'e, E: PgExecutor<'e>>(
        db: E,
        status: Option<Status>,
    ) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY id ASC
            "#
        ))
        .bind(status.map(Status::as_str))
        .fetch_all(db)
        .await?
        .into_iter()
        .map(decode)
        .collect()
    }

    /// Apply the present fields of `update`. Returns `None` if no such user.
    pub async fn update_profile<'e, E: PgExecutor<'e>>(
        db: E,
        id: i64,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
               SET display_name = COALESCE($2, display_name),
                   original_id  = COALESCE($3, original_id),
                   role         = COALESCE($4, role),
                   color_code   = COALESCE($5, color_code),
                   nfc_card_id  = COALESCE($6, nfc_card_id),
                   is_deleted   = COALESCE($7, is_deleted),
                   updated_at   = now()
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.display_name.as_deref())
        .bind(update.original_id.as_deref())
        .bind(update.role.map(Role::as_str))
        .bind(update.color_code.as_deref())
        .bind(update.nfc_card_id.as_deref())
        .bind(update.is_deleted)
        .fetch_optional(db)
        .await?
        .map(decode)
        .transpose()
    }

    /// Returns the number of rows touched (0 when the user does not exist).
    pub async fn set_status<'e, E: PgExecutor<'e>>(
        db: E,
        id: i64,
        status: Status,
    ) -> Result<u64, sqlx::Error> {
        let res = sqlx::query("UPDATE users SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(db)
            .await?;
        Ok(res.rows_affected())
    }
}
