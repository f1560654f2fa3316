use tracing::{info, warn};

use crate::{
    artworks::{
        dto::CreateArtworkRequest,
        repo_types::{Artwork, ArtworkStatus, ArtworkWithArtist, NewArtwork},
    },
    auth::jwt::SessionIdentity,
    error::{AppError, AppResult},
    state::AppState,
    users::repo_types::Role,
};

/// Pending submissions an artist may hold at once.
pub const MAX_PENDING: i64 = 3;

fn artwork_not_found() -> AppError {
    AppError::NotFound("Artwork not found.".into())
}

pub async fn create(
    state: &AppState,
    artist_id: i64,
    payload: CreateArtworkRequest,
) -> AppResult<Artwork> {
    let new = NewArtwork {
        title: payload.titulo_obra.trim().to_string(),
        description: payload.descricao_obra.trim().to_string(),
        image: payload.imagens_obras.trim().to_string(),
        category: payload.categoria_obra.trim().to_string(),
        exhibition_start: payload.data_exposicao,
        exhibition_end: payload.data_fim_exposicao,
    };
    if new.title.is_empty()
        || new.description.is_empty()
        || new.image.is_empty()
        || new.category.is_empty()
    {
        return Err(AppError::validation(
            "titulo_obra, descricao_obra, imagens_obras and categoria_obra are required.",
        ));
    }

    let Some(artwork) = state
        .artworks
        .insert_within_quota(artist_id, new, MAX_PENDING)
        .await?
    else {
        warn!(artist_id, "pending quota reached");
        return Err(AppError::QuotaExceeded(format!(
            "You already have {MAX_PENDING} artworks awaiting review."
        )));
    };

    info!(artist_id, artwork_id = artwork.id, "artwork submitted");
    Ok(artwork)
}

pub async fn list_mine(state: &AppState, artist_id: i64) -> AppResult<Vec<ArtworkWithArtist>> {
    state.artworks.list(Some(artist_id), None).await
}

/// Only the owning ARTISTA may delete; admins are refused as well.
pub async fn delete(state: &AppState, id: i64, caller: &SessionIdentity) -> AppResult<()> {
    let artwork = state
        .artworks
        .find_by_id(id)
        .await?
        .ok_or_else(artwork_not_found)?;

    if caller.role != Role::Artista || artwork.artist_id != caller.id {
        warn!(artwork_id = id, caller_id = caller.id, "delete refused");
        return Err(AppError::Forbidden(
            "You are not allowed to delete this artwork.".into(),
        ));
    }

    if !state.artworks.delete(id).await? {
        return Err(artwork_not_found());
    }
    info!(artwork_id = id, artist_id = caller.id, "artwork deleted");
    Ok(())
}

pub async fn list_all(state: &AppState) -> AppResult<Vec<ArtworkWithArtist>> {
    state.artworks.list(None, None).await
}

pub async fn list_by_artist(
    state: &AppState,
    artist_id: i64,
    status: Option<&str>,
) -> AppResult<Vec<ArtworkWithArtist>> {
    let status = status
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<ArtworkStatus>)
        .transpose()?;
    state.artworks.list(Some(artist_id), status).await
}

/// Overwrites the status, whatever it was before.
pub async fn update_status(state: &AppState, id: i64, status: &str) -> AppResult<Artwork> {
    let status: ArtworkStatus = status.trim().parse()?;
    let artwork = state
        .artworks
        .update_status(id, status)
        .await?
        .ok_or_else(artwork_not_found)?;
    info!(artwork_id = id, status = status.as_str(), "artwork status updated");
    Ok(artwork)
}

pub async fn list_approved(state: &AppState) -> AppResult<Vec<ArtworkWithArtist>> {
    state.artworks.list(None, Some(ArtworkStatus::Approved)).await
}
