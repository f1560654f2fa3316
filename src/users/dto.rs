use serde::{Deserialize, Serialize};

use crate::users::repo_types::{Role, User};

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub nome: String,
    pub email: String,
    pub contato: String,
    pub foto: Option<String>,
    pub bio: Option<String>,
    pub role: Role,
}

impl From<User> for ProfileResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            nome: u.name,
            email: u.email,
            contato: u.contact,
            foto: u.photo,
            bio: u.bio,
            role: u.role,
        }
    }
}

/// Body of `PUT /user/me`. Unknown keys such as `id` or `role` are dropped by
/// serde; `senha` is captured only so it can be refused.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub contato: Option<String>,
    pub bio: Option<String>,
    pub senha: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct PhotoResponse {
    pub message: &'static str,
    pub foto: String,
}
