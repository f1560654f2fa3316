use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::{
    auth::claims::{Claims, TokenKind},
    config::JwtConfig,
    state::AppState,
    users::repo_types::{Role, User},
};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
    #[error("token is not a {0:?} token")]
    WrongKind(TokenKind),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e),
        }
    }
}

/// Identity carried by a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub id: i64,
    pub role: Role,
    pub email: String,
}

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub session_ttl: Duration,
    pub google_session_ttl: Duration,
    pub reset_ttl: Duration,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        let minutes = |m: i64| Duration::from_secs((m.max(1) as u64) * 60);
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            session_ttl: minutes(cfg.ttl_minutes),
            google_session_ttl: minutes(cfg.google_ttl_minutes),
            reset_ttl: minutes(cfg.reset_ttl_minutes),
        }
    }

    fn sign_with_kind(
        &self,
        user: &User,
        kind: TokenKind,
        ttl: Duration,
    ) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        let claims = Claims {
            id: user.id,
            email: user.email.clone(),
            role: match kind {
                TokenKind::Session => Some(user.role),
                TokenKind::PasswordReset => None,
            },
            kind,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = user.id, kind = ?kind, "jwt signed");
        Ok(token)
    }

    /// Session token for password login.
    pub fn sign_session(&self, user: &User) -> anyhow::Result<String> {
        self.sign_with_kind(user, TokenKind::Session, self.session_ttl)
    }

    /// Session token for Google login, which lives longer.
    pub fn sign_google_session(&self, user: &User) -> anyhow::Result<String> {
        self.sign_with_kind(user, TokenKind::Session, self.google_session_ttl)
    }

    pub fn sign_reset(&self, user: &User) -> anyhow::Result<String> {
        self.sign_with_kind(user, TokenKind::PasswordReset, self.reset_ttl)
    }

    /// Checks signature, expiry, issuer and audience; not the token kind.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = data.claims.id, kind = ?data.claims.kind, "jwt verified");
        Ok(data.claims)
    }

    pub fn verify_session(&self, token: &str) -> Result<SessionIdentity, TokenError> {
        let claims = self.verify(token)?;
        match (claims.kind, claims.role) {
            (TokenKind::Session, Some(role)) => Ok(SessionIdentity {
                id: claims.id,
                role,
                email: claims.email,
            }),
            _ => Err(TokenError::WrongKind(TokenKind::Session)),
        }
    }

    pub fn verify_reset(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.verify(token)?;
        if claims.kind != TokenKind::PasswordReset {
            return Err(TokenError::WrongKind(TokenKind::PasswordReset));
        }
        Ok(claims)
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::new(&state.config.jwt)
    }
}
