use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Closed set of account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Artista,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Artista => "ARTISTA",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,              // always stored lowercase
    pub password_hash: String,      // empty for Google-only accounts
    pub contact: String,
    pub photo: Option<String>,
    pub bio: Option<String>,
    pub role: Role,
    pub created_at: OffsetDateTime,
}

impl User {
    /// Accounts provisioned through Google login have no local password.
    pub fn is_oauth_only(&self) -> bool {
        self.password_hash.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub contact: String,
    pub photo: Option<String>,
    pub role: Role,
}

/// The only profile fields a user may change about themselves.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
    pub bio: Option<String>,
}
