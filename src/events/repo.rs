use axum::async_trait;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::events::repo_types::{Event, EventChanges, EventWithCreator, NewEvent};

const EVENT_COLUMNS: &str =
    "id, title, description, location, image, starts_at, ends_at, kind, created_by";

const SELECT_WITH_CREATOR: &str = r#"
    SELECT e.id, e.title, e.description, e.location, e.image, e.starts_at, e.ends_at,
           e.kind, e.created_by, u.name AS creator_name, u.email AS creator_email
      FROM events e
      JOIN users u ON u.id = e.created_by
"#;

#[async_trait]
pub trait EventRepo: Send + Sync {
    async fn list(&self) -> AppResult<Vec<EventWithCreator>>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<EventWithCreator>>;
    async fn create(&self, new: NewEvent) -> AppResult<Event>;
    /// `None` when no event has this id.
    async fn update(&self, id: i64, changes: EventChanges) -> AppResult<Option<Event>>;
    async fn delete(&self, id: i64) -> AppResult<bool>;
}

#[derive(Clone)]
pub struct PgEventRepo {
    db: PgPool,
}

impl PgEventRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventRepo for PgEventRepo {
    async fn list(&self) -> AppResult<Vec<EventWithCreator>> {
        let rows = sqlx::query_as::<_, EventWithCreator>(&format!(
            "{SELECT_WITH_CREATOR} ORDER BY e.starts_at ASC, e.id ASC"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<EventWithCreator>> {
        let row = sqlx::query_as::<_, EventWithCreator>(&format!(
            "{SELECT_WITH_CREATOR} WHERE e.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn create(&self, new: NewEvent) -> AppResult<Event> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events
                (title, description, location, image, starts_at, ends_at, kind, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.location)
        .bind(&new.image)
        .bind(new.starts_at)
        .bind(new.ends_at)
        .bind(new.kind)
        .bind(new.created_by)
        .fetch_one(&self.db)
        .await?;
        Ok(event)
    }

    async fn update(&self, id: i64, changes: EventChanges) -> AppResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
               SET title       = COALESCE($2, title),
                   description = COALESCE($3, description),
                   location    = COALESCE($4, location),
                   image       = COALESCE($5, image),
                   starts_at   = COALESCE($6, starts_at),
                   ends_at     = COALESCE($7, ends_at),
                   kind        = COALESCE($8, kind)
             WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.location)
        .bind(changes.image)
        .bind(changes.starts_at)
        .bind(changes.ends_at)
        .bind(changes.kind)
        .fetch_optional(&self.db)
        .await?;
        Ok(event)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let res = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() == 1)
    }
}

#[cfg(test)]
mod pg_tests {
    use super::*;
    use crate::events::repo_types::EventKind;
    use crate::users::repo::{PgUserRepo, UserRepo};
    use crate::users::repo_types::{NewUser, Role};
    use time::macros::datetime;

    async fn admin(pool: &PgPool) -> i64 {
        PgUserRepo::new(pool.clone())
            .create(NewUser {
                name: "Root".into(),
                email: "root@x.com".into(),
                password_hash: "x".into(),
                contact: "1".into(),
                photo: None,
                role: Role::Admin,
            })
            .await
            .unwrap()
            .id
    }

    fn opening(created_by: i64) -> NewEvent {
        NewEvent {
            title: "Abertura".into(),
            description: "Noite de abertura".into(),
            location: "Sala 1".into(),
            image: None,
            starts_at: datetime!(2026-05-01 19:00 UTC),
            ends_at: datetime!(2026-05-01 22:00 UTC),
            kind: EventKind::Exhibition,
            created_by,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn partial_update_keeps_omitted_fields(pool: PgPool) {
        let root = admin(&pool).await;
        let repo = PgEventRepo::new(pool);
        let event = repo.create(opening(root)).await.unwrap();

        let updated = repo
            .update(
                event.id,
                EventChanges {
                    location: Some("Sala 2".into()),
                    kind: Some(EventKind::Lecture),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.location, "Sala 2");
        assert_eq!(updated.kind, EventKind::Lecture);
        assert_eq!(updated.title, "Abertura");
        assert_eq!(updated.starts_at, event.starts_at);
        assert_eq!(updated.created_by, root);

        assert!(repo.update(4242, EventChanges::default()).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn listing_joins_creator_and_delete_reports_missing(pool: PgPool) {
        let root = admin(&pool).await;
        let repo = PgEventRepo::new(pool);
        let event = repo.create(opening(root)).await.unwrap();

        let found = repo.find_by_id(event.id).await.unwrap().unwrap();
        assert_eq!(found.creator_email, "root@x.com");
        assert_eq!(repo.list().await.unwrap().len(), 1);

        assert!(repo.delete(event.id).await.unwrap());
        assert!(!repo.delete(event.id).await.unwrap());
        assert!(repo.find_by_id(event.id).await.unwrap().is_none());
    }
}
