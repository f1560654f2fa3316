use axum::async_trait;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::users::repo_types::{NewUser, ProfileChanges, User};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, contact, photo, bio, role, created_at";

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    /// Fails with `Conflict` when the email is already taken.
    async fn create(&self, new: NewUser) -> AppResult<User>;
    /// Applies only the fields that are `Some`. `None` when the user is gone.
    async fn update_profile(&self, id: i64, changes: ProfileChanges) -> AppResult<Option<User>>;
    async fn set_password_hash(&self, id: i64, password_hash: &str) -> AppResult<bool>;
    async fn set_photo(&self, id: i64, url: &str) -> AppResult<bool>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(&self, new: NewUser) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, contact, photo, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.contact)
        .bind(&new.photo)
        .bind(new.role)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn update_profile(&self, id: i64, changes: ProfileChanges) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET name    = COALESCE($2, name),
                   email   = COALESCE($3, email),
                   contact = COALESCE($4, contact),
                   bio     = COALESCE($5, bio)
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.contact)
        .bind(changes.bio)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn set_password_hash(&self, id: i64, password_hash: &str) -> AppResult<bool> {
        let res = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn set_photo(&self, id: i64, url: &str) -> AppResult<bool> {
        let res = sqlx::query("UPDATE users SET photo = $2 WHERE id = $1")
            .bind(id)
            .bind(url)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() == 1)
    }
}
