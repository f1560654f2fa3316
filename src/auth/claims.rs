use serde::{Deserialize, Serialize};

use crate::users::repo_types::Role;

/// Purpose of a signed token. Serialized in the `type` claim.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Session,
    PasswordReset,
}

/// JWT payload shared by session and password-reset tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,                // user ID
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,     // present on session tokens only
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}
