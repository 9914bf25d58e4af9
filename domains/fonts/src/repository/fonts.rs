//! Font repository (durable store)

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{Font, FontDraft, FontFiles, FontStatus};
use crate::store::FontStore;
use typecraft_common::{Error, Result};

/// All columns in the fonts table, used for SELECT and RETURNING clauses.
const FONT_COLUMNS: &str = "\
    id, owner, family_name, prompt, status, \
    preview_url, ttf_url, otf_url, woff2_url, \
    error, created_at, updated_at";

#[derive(Clone)]
pub struct PgFontStore {
    pool: PgPool,
}

impl PgFontStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: Uuid) -> Result<Font> {
        let query = format!("SELECT {FONT_COLUMNS} FROM fonts WHERE id = $1");
        sqlx::query_as::<_, Font>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("No font record for {}", id)))
    }

    /// Persist a status change guarded by the expected current status; a
    /// concurrent change loses the race and surfaces as `InvalidTransition`.
    async fn persist_transition(&self, font: &Font, expected: FontStatus) -> Result<Font> {
        let query = format!(
            "UPDATE fonts SET \
                status = $2, ttf_url = $3, otf_url = $4, woff2_url = $5, \
                error = $6, updated_at = $7 \
             WHERE id = $1 AND status = $8 \
             RETURNING {FONT_COLUMNS}"
        );
        sqlx::query_as::<_, Font>(&query)
            .bind(font.id)
            .bind(font.status)
            .bind(&font.files.ttf_url)
            .bind(&font.files.otf_url)
            .bind(&font.files.woff2_url)
            .bind(&font.error)
            .bind(font.updated_at)
            .bind(expected)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                Error::InvalidTransition(format!(
                    "font {} is no longer '{}'",
                    font.id, expected
                ))
            })
    }
}

#[async_trait::async_trait]
impl FontStore for PgFontStore {
    async fn create(&self, owner: Uuid, draft: FontDraft) -> Result<Font> {
        let mut font = Font::new(owner, draft);
        font.begin_processing()?;

        let query = format!(
            "INSERT INTO fonts ({FONT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {FONT_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Font>(&query)
            .bind(font.id)
            .bind(font.owner)
            .bind(&font.family_name)
            .bind(&font.prompt)
            .bind(font.status)
            .bind(&font.preview_url)
            .bind(&font.files.ttf_url)
            .bind(&font.files.otf_url)
            .bind(&font.files.woff2_url)
            .bind(&font.error)
            .bind(font.created_at)
            .bind(font.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn commit(&self, id: Uuid, files: FontFiles) -> Result<Font> {
        let mut font = self.fetch(id).await?;
        let expected = font.status;
        font.mark_ready(files)?;
        self.persist_transition(&font, expected).await
    }

    async fn mark_failed(&self, id: Uuid, reason: &str) -> Result<Font> {
        let mut font = self.fetch(id).await?;
        let expected = font.status;
        font.mark_failed(reason)?;
        self.persist_transition(&font, expected).await
    }

    async fn find(&self, id: Uuid) -> Result<Option<Font>> {
        let query = format!("SELECT {FONT_COLUMNS} FROM fonts WHERE id = $1");
        let font = sqlx::query_as::<_, Font>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(font)
    }

    async fn list(&self, owner: Uuid) -> Result<Vec<Font>> {
        let query = format!(
            "SELECT {FONT_COLUMNS} FROM fonts \
             WHERE owner = $1 ORDER BY created_at DESC"
        );
        let fonts = sqlx::query_as::<_, Font>(&query)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;

        Ok(fonts)
    }
}
