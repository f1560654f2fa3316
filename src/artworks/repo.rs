use axum::async_trait;
use sqlx::PgPool;

use crate::artworks::repo_types::{Artwork, ArtworkStatus, ArtworkWithArtist, NewArtwork};
use crate::error::{AppError, AppResult};

const ARTWORK_COLUMNS: &str = "id, title, description, image, category, exhibition_start, \
     exhibition_end, status, submitted_at, artist_id";

#[async_trait]
pub trait ArtworkRepo: Send + Sync {
    /// Inserts a pending artwork unless the artist already holds
    /// `max_pending` pending ones. Check and insert are atomic per artist.
    /// Returns `None` when the quota is reached and `NotFound` when the
    /// artist no longer exists.
    async fn insert_within_quota(
        &self,
        artist_id: i64,
        new: NewArtwork,
        max_pending: i64,
    ) -> AppResult<Option<Artwork>>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Artwork>>;

    /// Newest submission first. `None` filters mean "any".
    async fn list(
        &self,
        artist_id: Option<i64>,
        status: Option<ArtworkStatus>,
    ) -> AppResult<Vec<ArtworkWithArtist>>;

    async fn delete(&self, id: i64) -> AppResult<bool>;

    async fn update_status(&self, id: i64, status: ArtworkStatus) -> AppResult<Option<Artwork>>;
}

#[derive(Clone)]
pub struct PgArtworkRepo {
    db: PgPool,
}

impl PgArtworkRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ArtworkRepo for PgArtworkRepo {
    async fn insert_within_quota(
        &self,
        artist_id: i64,
        new: NewArtwork,
        max_pending: i64,
    ) -> AppResult<Option<Artwork>> {
        let mut tx = self.db.begin().await?;

        // Row lock on the artist serializes concurrent submissions.
        let locked: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(artist_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            tx.rollback().await?;
            return Err(AppError::NotFound("Artist not found.".into()));
        }

        let (pending,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM artworks WHERE artist_id = $1 AND status = 'pendente'",
        )
        .bind(artist_id)
        .fetch_one(&mut *tx)
        .await?;

        if pending >= max_pending {
            tx.rollback().await?;
            return Ok(None);
        }

        let artwork = sqlx::query_as::<_, Artwork>(&format!(
            r#"
            INSERT INTO artworks
                (title, description, image, category, exhibition_start, exhibition_end, artist_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ARTWORK_COLUMNS}
            "#
        ))
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.image)
        .bind(&new.category)
        .bind(new.exhibition_start)
        .bind(new.exhibition_end)
        .bind(artist_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(artwork))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Artwork>> {
        let artwork = sqlx::query_as::<_, Artwork>(&format!(
            "SELECT {ARTWORK_COLUMNS} FROM artworks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(artwork)
    }

    async fn list(
        &self,
        artist_id: Option<i64>,
        status: Option<ArtworkStatus>,
    ) -> AppResult<Vec<ArtworkWithArtist>> {
        let rows = sqlx::query_as::<_, ArtworkWithArtist>(
            r#"
            SELECT a.id, a.title, a.description, a.image, a.category,
                   a.exhibition_start, a.exhibition_end, a.status, a.submitted_at,
                   a.artist_id, u.name AS artist_name, u.email AS artist_email
              FROM artworks a
              JOIN users u ON u.id = a.artist_id
             WHERE ($1::BIGINT IS NULL OR a.artist_id = $1)
               AND ($2::artwork_status IS NULL OR a.status = $2)
             ORDER BY a.submitted_at DESC, a.id DESC
            "#,
        )
        .bind(artist_id)
        .bind(status)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let res = sqlx::query("DELETE FROM artworks WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn update_status(&self, id: i64, status: ArtworkStatus) -> AppResult<Option<Artwork>> {
        let artwork = sqlx::query_as::<_, Artwork>(&format!(
            "UPDATE artworks SET status = $2 WHERE id = $1 RETURNING {ARTWORK_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.db)
        .await?;
        Ok(artwork)
    }
}
