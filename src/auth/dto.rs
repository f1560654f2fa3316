use serde::{Deserialize, Serialize};

use crate::users::repo_types::{Role, User};

/// Request body for user registration. Missing strings are caught by
/// validation so the client gets a readable message.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub senha: String,
    #[serde(default)]
    pub contato: String,
    pub role: Option<Role>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub senha: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct GoogleLoginRequest {
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default, rename = "novaSenha")]
    pub nova_senha: String,
}

/// Returned after registration.
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: i64,
    pub nome: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for RegisteredUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            nome: u.name,
            email: u.email,
            role: u.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct GoogleUser {
    pub id: i64,
    pub nome: String,
    pub email: String,
    pub foto: Option<String>,
    pub role: Role,
}

impl From<User> for GoogleUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            nome: u.name,
            email: u.email,
            foto: u.photo,
            role: u.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GoogleLoginResponse {
    pub token: String,
    pub user: GoogleUser,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
