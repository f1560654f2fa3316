use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::events::repo_types::{Event, EventKind, EventWithCreator};

/// Create and update share one body; on update every field is optional.
/// `tipo_evento` stays a string so it can be upper-cased before parsing.
#[derive(Debug, Default, Deserialize)]
pub struct EventRequest {
    pub titulo_evento: Option<String>,
    pub descricao_evento: Option<String>,
    pub local_evento: Option<String>,
    pub imagem_evento: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub data_hora_inicio: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub data_hora_fim: Option<OffsetDateTime>,
    pub tipo_evento: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatorSummary {
    pub id: i64,
    pub nome: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id_evento: i64,
    pub titulo_evento: String,
    pub descricao_evento: String,
    pub local_evento: String,
    pub imagem_evento: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub data_hora_inicio: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub data_hora_fim: OffsetDateTime,
    pub tipo_evento: EventKind,
    pub criado_por_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criado_por: Option<CreatorSummary>,
}

impl From<Event> for EventResponse {
    fn from(e: Event) -> Self {
        Self {
            id_evento: e.id,
            titulo_evento: e.title,
            descricao_evento: e.description,
            local_evento: e.location,
            imagem_evento: e.image,
            data_hora_inicio: e.starts_at,
            data_hora_fim: e.ends_at,
            tipo_evento: e.kind,
            criado_por_id: e.created_by,
            criado_por: None,
        }
    }
}

impl From<EventWithCreator> for EventResponse {
    fn from(row: EventWithCreator) -> Self {
        let creator = CreatorSummary {
            id: row.event.created_by,
            nome: row.creator_name,
            email: row.creator_email,
        };
        Self {
            criado_por: Some(creator),
            ..row.event.into()
        }
    }
}
