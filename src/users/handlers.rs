use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::AppResult,
    extract::{AppJson, AppMultipart},
    images::{handlers::UPLOAD_BODY_LIMIT, services::read_image_field},
    state::AppState,
    users::{
        dto::{PhotoResponse, ProfileResponse, UpdateProfileRequest},
        services,
    },
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/user/me", get(get_me).put(update_me))
        .route(
            "/user/me/photo",
            post(upload_photo).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
) -> AppResult<Json<ProfileResponse>> {
    let user = services::get_profile(&state, me.id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<ProfileResponse>> {
    let user = services::update_profile(&state, me.id, payload).await?;
    Ok(Json(user.into()))
}

/// POST /user/me/photo (multipart, field `file`)
#[instrument(skip(state, mp))]
pub async fn upload_photo(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    AppMultipart(mut mp): AppMultipart,
) -> AppResult<Json<PhotoResponse>> {
    let upload = read_image_field(&mut mp).await?;
    let foto = services::upload_profile_photo(&state, me.id, upload).await?;
    Ok(Json(PhotoResponse {
        message: "Profile photo updated.",
        foto,
    }))
}
