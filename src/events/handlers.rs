use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::instrument;

use crate::{
    auth::{
        dto::MessageResponse,
        extractors::{AdminUser, MemberUser, RequireRole},
    },
    error::AppResult,
    events::{
        dto::{EventRequest, EventResponse},
        services,
    },
    extract::{AppJson, AppPath},
    state::AppState,
};

pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/eventos", get(list_events).post(create_event))
        .route(
            "/eventos/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
}

#[instrument(skip(state))]
pub async fn list_events(
    State(state): State<AppState>,
    _member: MemberUser,
) -> AppResult<Json<Vec<EventResponse>>> {
    let rows = services::list(&state).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
pub async fn get_event(
    State(state): State<AppState>,
    _member: MemberUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<EventResponse>> {
    Ok(Json(services::get(&state, id).await?.into()))
}

#[instrument(skip(state, payload))]
pub async fn create_event(
    State(state): State<AppState>,
    RequireRole(admin, _): AdminUser,
    AppJson(payload): AppJson<EventRequest>,
) -> AppResult<(StatusCode, Json<EventResponse>)> {
    let event = services::create(&state, admin.id, payload).await?;
    Ok((StatusCode::CREATED, Json(event.into())))
}

#[instrument(skip(state, payload))]
pub async fn update_event(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<EventRequest>,
) -> AppResult<Json<EventResponse>> {
    Ok(Json(services::update(&state, id, payload).await?.into()))
}

#[instrument(skip(state))]
pub async fn delete_event(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<MessageResponse>> {
    services::delete(&state, id).await?;
    Ok(Json(MessageResponse::new("Event deleted.")))
}
