use axum::{extract::DefaultBodyLimit, extract::State, routing::post, Json, Router};
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    auth::extractors::{AdminUser, RequireRole},
    error::AppResult,
    extract::AppMultipart,
    images::services::{read_image_field, store_event_image, MAX_IMAGE_BYTES},
    state::AppState,
};

/// Headroom over the image limit for multipart framing, so oversized files
/// reach our own check and get the JSON error.
pub const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES * 2;

#[derive(Debug, Serialize)]
pub struct EventImageResponse {
    pub imagem_evento: String,
}

pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_event_image))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

/// POST /upload (multipart, ADMIN)
#[instrument(skip(state, mp))]
pub async fn upload_event_image(
    State(state): State<AppState>,
    RequireRole(admin, _): AdminUser,
    AppMultipart(mut mp): AppMultipart,
) -> AppResult<Json<EventImageResponse>> {
    let upload = read_image_field(&mut mp).await?;
    let url = store_event_image(&state, upload).await?;
    info!(admin_id = admin.id, %url, "event image uploaded");
    Ok(Json(EventImageResponse { imagem_evento: url }))
}
