use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub google_ttl_minutes: i64,
    pub reset_ttl_minutes: i64,
}

/// SMTP settings for outgoing mail. Absent when `EMAIL_MUSEUM` / `EMAIL_PASS`
/// are not set, in which case password reset mails cannot be sent.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub frontend_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub google_client_id: Option<String>,
    pub mail: Option<MailConfig>,
    pub uploads: UploadConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "museu".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "museu-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(120),
            google_ttl_minutes: env_parse("JWT_GOOGLE_TTL_MINUTES").unwrap_or(480),
            reset_ttl_minutes: env_parse("JWT_RESET_TTL_MINUTES").unwrap_or(60),
        };

        let google_client_id = std::env::var("GOOGLE_CLIENT_ID")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let mail = match (
            std::env::var("EMAIL_MUSEUM").ok().filter(|v| !v.is_empty()),
            std::env::var("EMAIL_PASS").ok().filter(|v| !v.is_empty()),
        ) {
            (Some(username), Some(password)) => Some(MailConfig {
                smtp_host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".into()),
                smtp_port: env_parse("SMTP_PORT").unwrap_or(587),
                from_address: username.clone(),
                username,
                password,
                frontend_url: std::env::var("FRONTEND_URL")
                    .unwrap_or_else(|_| "http://localhost:3000".into()),
            }),
            _ => None,
        };

        let uploads = UploadConfig {
            dir: std::env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "uploads".into())
                .into(),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3333".into())
                .trim_end_matches('/')
                .to_string(),
        };

        Ok(Self {
            database_url,
            jwt,
            google_client_id,
            mail,
            uploads,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
