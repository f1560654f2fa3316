use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, patch},
    Json, Router,
};
use tracing::instrument;

use crate::{
    artworks::{
        dto::{
            ArtworkResponse, CreateArtworkRequest, StatusFilter, StatusUpdatedResponse,
            UpdateStatusRequest,
        },
        services,
    },
    auth::{
        dto::MessageResponse,
        extractors::{AdminUser, ArtistUser, AuthUser, MemberUser, RequireRole},
    },
    error::AppResult,
    extract::{AppJson, AppPath, AppQuery},
    state::AppState,
};

pub fn artist_routes() -> Router<AppState> {
    Router::new()
        .route("/obra", get(list_gallery).post(create_artwork))
        .route("/obra/minhas", get(list_mine))
        .route("/obra/:id", delete(delete_artwork))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/obra/admin", get(list_all))
        .route("/obra/admin/:id/status", patch(update_status))
        .route("/obra/admin/artista/:id", get(list_by_artist))
}

fn to_response<T: Into<ArtworkResponse>>(rows: Vec<T>) -> Json<Vec<ArtworkResponse>> {
    Json(rows.into_iter().map(Into::into).collect())
}

#[instrument(skip(state))]
pub async fn list_gallery(
    State(state): State<AppState>,
    _member: MemberUser,
) -> AppResult<Json<Vec<ArtworkResponse>>> {
    Ok(to_response(services::list_approved(&state).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_artwork(
    State(state): State<AppState>,
    RequireRole(artist, _): ArtistUser,
    AppJson(payload): AppJson<CreateArtworkRequest>,
) -> AppResult<(StatusCode, Json<ArtworkResponse>)> {
    let artwork = services::create(&state, artist.id, payload).await?;
    Ok((StatusCode::CREATED, Json(artwork.into())))
}

#[instrument(skip(state))]
pub async fn list_mine(
    State(state): State<AppState>,
    RequireRole(artist, _): ArtistUser,
) -> AppResult<Json<Vec<ArtworkResponse>>> {
    Ok(to_response(services::list_mine(&state, artist.id).await?))
}

#[instrument(skip(state))]
pub async fn delete_artwork(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<MessageResponse>> {
    services::delete(&state, id, &caller).await?;
    Ok(Json(MessageResponse::new("Artwork deleted.")))
}

#[instrument(skip(state))]
pub async fn list_all(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<ArtworkResponse>>> {
    Ok(to_response(services::list_all(&state).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateStatusRequest>,
) -> AppResult<Json<StatusUpdatedResponse>> {
    let artwork = services::update_status(&state, id, &payload.status).await?;
    Ok(Json(StatusUpdatedResponse {
        message: "Status updated.",
        obra: artwork.into(),
    }))
}

#[instrument(skip(state))]
pub async fn list_by_artist(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppPath(artist_id): AppPath<i64>,
    AppQuery(filter): AppQuery<StatusFilter>,
) -> AppResult<Json<Vec<ArtworkResponse>>> {
    let rows = services::list_by_artist(&state, artist_id, filter.status.as_deref()).await?;
    Ok(to_response(rows))
}
