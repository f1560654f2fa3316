use tracing::info;

use crate::{
    error::{AppError, AppResult},
    events::{
        dto::EventRequest,
        repo_types::{Event, EventChanges, EventKind, EventWithCreator, NewEvent},
    },
    state::AppState,
};

fn event_not_found() -> AppError {
    AppError::NotFound("Event not found.".into())
}

fn trimmed(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_kind(raw: Option<String>) -> AppResult<Option<EventKind>> {
    trimmed(raw).map(|k| k.parse()).transpose()
}

pub async fn list(state: &AppState) -> AppResult<Vec<EventWithCreator>> {
    state.events.list().await
}

pub async fn get(state: &AppState, id: i64) -> AppResult<EventWithCreator> {
    state.events.find_by_id(id).await?.ok_or_else(event_not_found)
}

pub async fn create(state: &AppState, admin_id: i64, payload: EventRequest) -> AppResult<Event> {
    let kind = parse_kind(payload.tipo_evento)?;
    let (Some(title), Some(description), Some(location), Some(starts_at), Some(ends_at), Some(kind)) = (
        trimmed(payload.titulo_evento),
        trimmed(payload.descricao_evento),
        trimmed(payload.local_evento),
        payload.data_hora_inicio,
        payload.data_hora_fim,
        kind,
    ) else {
        return Err(AppError::validation(
            "titulo_evento, descricao_evento, local_evento, data_hora_inicio, \
             data_hora_fim and tipo_evento are required.",
        ));
    };

    let event = state
        .events
        .create(NewEvent {
            title,
            description,
            location,
            image: trimmed(payload.imagem_evento),
            starts_at,
            ends_at,
            kind,
            created_by: admin_id,
        })
        .await?;
    info!(event_id = event.id, admin_id, kind = kind.as_str(), "event created");
    Ok(event)
}

/// Partial merge: only supplied, non-blank fields change.
pub async fn update(state: &AppState, id: i64, payload: EventRequest) -> AppResult<Event> {
    let changes = EventChanges {
        kind: parse_kind(payload.tipo_evento)?,
        title: trimmed(payload.titulo_evento),
        description: trimmed(payload.descricao_evento),
        location: trimmed(payload.local_evento),
        image: trimmed(payload.imagem_evento),
        starts_at: payload.data_hora_inicio,
        ends_at: payload.data_hora_fim,
    };
    let event = state
        .events
        .update(id, changes)
        .await?
        .ok_or_else(event_not_found)?;
    info!(event_id = id, "event updated");
    Ok(event)
}

pub async fn delete(state: &AppState, id: i64) -> AppResult<()> {
    if !state.events.delete(id).await? {
        return Err(event_not_found());
    }
    info!(event_id = id, "event deleted");
    Ok(())
}
