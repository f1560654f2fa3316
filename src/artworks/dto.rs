use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::artworks::repo_types::{Artwork, ArtworkStatus, ArtworkWithArtist};

#[derive(Debug, Default, Deserialize)]
pub struct CreateArtworkRequest {
    #[serde(default)]
    pub titulo_obra: String,
    #[serde(default)]
    pub descricao_obra: String,
    #[serde(default)]
    pub imagens_obras: String,
    #[serde(default)]
    pub categoria_obra: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub data_exposicao: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub data_fim_exposicao: Option<OffsetDateTime>,
}

/// Status is kept as a string so an unknown value yields our own message.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ArtistSummary {
    pub id: i64,
    pub nome: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct ArtworkResponse {
    pub id_obra: i64,
    pub titulo_obra: String,
    pub descricao_obra: String,
    pub imagens_obras: String,
    pub categoria_obra: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub data_exposicao: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub data_fim_exposicao: Option<OffsetDateTime>,
    pub status: ArtworkStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub data_envio: OffsetDateTime,
    pub artista_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artista: Option<ArtistSummary>,
}

impl From<Artwork> for ArtworkResponse {
    fn from(a: Artwork) -> Self {
        Self {
            id_obra: a.id,
            titulo_obra: a.title,
            descricao_obra: a.description,
            imagens_obras: a.image,
            categoria_obra: a.category,
            data_exposicao: a.exhibition_start,
            data_fim_exposicao: a.exhibition_end,
            status: a.status,
            data_envio: a.submitted_at,
            artista_id: a.artist_id,
            artista: None,
        }
    }
}

impl From<ArtworkWithArtist> for ArtworkResponse {
    fn from(row: ArtworkWithArtist) -> Self {
        let artista = ArtistSummary {
            id: row.artwork.artist_id,
            nome: row.artist_name,
            email: row.artist_email,
        };
        Self {
            artista: Some(artista),
            ..row.artwork.into()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusUpdatedResponse {
    pub message: &'static str,
    pub obra: ArtworkResponse,
}
