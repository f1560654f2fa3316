use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::error::AppError;

/// Moderation state of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "artwork_status")]
pub enum ArtworkStatus {
    #[sqlx(rename = "pendente")]
    #[serde(rename = "pendente")]
    Pending,
    #[sqlx(rename = "aprovada")]
    #[serde(rename = "aprovada")]
    Approved,
    #[sqlx(rename = "rejeitada")]
    #[serde(rename = "rejeitada")]
    Rejected,
}

impl ArtworkStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtworkStatus::Pending => "pendente",
            ArtworkStatus::Approved => "aprovada",
            ArtworkStatus::Rejected => "rejeitada",
        }
    }
}

impl FromStr for ArtworkStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendente" => Ok(ArtworkStatus::Pending),
            "aprovada" => Ok(ArtworkStatus::Approved),
            "rejeitada" => Ok(ArtworkStatus::Rejected),
            _ => Err(AppError::validation(
                "Invalid status. Use pendente, aprovada or rejeitada.",
            )),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Artwork {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image: String,
    pub category: String,
    pub exhibition_start: Option<OffsetDateTime>,
    pub exhibition_end: Option<OffsetDateTime>,
    pub status: ArtworkStatus,
    pub submitted_at: OffsetDateTime,
    pub artist_id: i64,
}

/// Artwork joined with the owning artist's name and email.
#[derive(Debug, Clone, FromRow)]
pub struct ArtworkWithArtist {
    #[sqlx(flatten)]
    pub artwork: Artwork,
    pub artist_name: String,
    pub artist_email: String,
}

#[derive(Debug, Clone)]
pub struct NewArtwork {
    pub title: String,
    pub description: String,
    pub image: String,
    pub category: String,
    pub exhibition_start: Option<OffsetDateTime>,
    pub exhibition_end: Option<OffsetDateTime>,
}
