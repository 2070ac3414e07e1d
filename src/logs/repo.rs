use sqlx::PgExecutor;

use crate::logs::repo_types::{Log, NewLog};

impl Log {
    pub async fn insert<'e, E: PgExecutor<'e>>(
        db: E,
        owner_id: i64,
        new: &NewLog,
    ) -> Result<Log, sqlx::Error> {
        sqlx::query_as::<_, Log>(
            r#"
            INSERT INTO logs (owner_id, action, place, note)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, action, place, note, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(&new.action)
        .bind(new.place.as_deref())
        .bind(new.note.as_deref())
        .fetch_one(db)
        .await
    }

    /// All logs of one owner in creation order.
    pub async fn list_by_owner<'e, E: PgExecutor<'e>>(
        db: E,
        owner_id: i64,
    ) -> Result<Vec<Log>, sqlx::Error> {
        sqlx::query_as::<_, Log>(
            r#"
            SELECT id, owner_id, action, place, note, created_at, updated_at
              FROM logs
             WHERE owner_id = $1
             ORDER BY id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(db)
        .await
    }
}
