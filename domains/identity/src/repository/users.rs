//! User directory repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::directory::UserDirectory;
use crate::domain::entities::UserRecord;
use typecraft_common::Result;

/// All columns in the users table, used for SELECT and RETURNING clauses.
const USER_COLUMNS: &str = "id, email, credits, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find(&self, id: Uuid) -> Result<Option<UserRecord>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let record = sqlx::query_as::<_, UserRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Provision an account row on first sight (the store's own trigger
    /// usually creates it on sign-up; this guards the race where the trigger
    /// has not yet run). `ON CONFLICT DO NOTHING` keeps concurrent
    /// first-requests safe.
    async fn ensure(&self, id: Uuid, email: &str) -> Result<UserRecord> {
        sqlx::query(
            "INSERT INTO users (id, email, credits, created_at, updated_at) \
             VALUES ($1, $2, 0, NOW(), NOW()) \
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(id)
        .bind(email)
        .execute(&self.pool)
        .await?;

        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let record = sqlx::query_as::<_, UserRecord>(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }
}
