use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_type")]
pub enum EventKind {
    #[sqlx(rename = "EXPOSICAO")]
    #[serde(rename = "EXPOSICAO")]
    Exhibition,
    #[sqlx(rename = "OFICINA")]
    #[serde(rename = "OFICINA")]
    Workshop,
    #[sqlx(rename = "PALESTRA")]
    #[serde(rename = "PALESTRA")]
    Lecture,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Exhibition, EventKind::Workshop, EventKind::Lecture];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Exhibition => "EXPOSICAO",
            EventKind::Workshop => "OFICINA",
            EventKind::Lecture => "PALESTRA",
        }
    }
}

/// Case-insensitive: `"oficina"` parses as [`EventKind::Workshop`].
impl FromStr for EventKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        EventKind::ALL
            .into_iter()
            .find(|k| k.as_str() == upper)
            .ok_or_else(|| {
                let allowed: Vec<&str> = EventKind::ALL.iter().map(|k| k.as_str()).collect();
                AppError::validation(format!(
                    "Invalid tipo_evento. Use: {}",
                    allowed.join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub image: Option<String>,
    pub starts_at: OffsetDateTime,
    pub ends_at: OffsetDateTime,
    pub kind: EventKind,
    pub created_by: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct EventWithCreator {
    #[sqlx(flatten)]
    pub event: Event,
    pub creator_name: String,
    pub creator_email: String,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    pub image: Option<String>,
    pub starts_at: OffsetDateTime,
    pub ends_at: OffsetDateTime,
    pub kind: EventKind,
    pub created_by: i64,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
    pub starts_at: Option<OffsetDateTime>,
    pub ends_at: Option<OffsetDateTime>,
    pub kind: Option<EventKind>,
}
