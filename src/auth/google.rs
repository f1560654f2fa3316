use std::time::{Duration, Instant};

use anyhow::Context;
use axum::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};

const GOOGLE_CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];
const KEYS_TTL: Duration = Duration::from_secs(60 * 60);

/// Profile fields taken from a verified Google ID token.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleProfile {
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[async_trait]
pub trait GoogleVerifier: Send + Sync {
    /// Fails with `Unauthorized` when the token does not verify.
    async fn verify(&self, id_token: &str) -> AppResult<GoogleProfile>;
}

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
}

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

struct CachedKeys {
    set: JwkSet,
    fetched_at: Instant,
}

fn invalid_token() -> AppError {
    AppError::Unauthorized("Invalid Google token.".into())
}

/// Verifies ID tokens against Google's published RS256 keys.
/// The key set is cached and refetched when stale or when a `kid` is unknown.
pub struct GoogleIdTokenVerifier {
    client_id: Option<String>,
    http: reqwest::Client,
    certs_url: String,
    keys_ttl: Duration,
    cache: RwLock<Option<CachedKeys>>,
}

impl GoogleIdTokenVerifier {
    pub fn new(client_id: Option<String>) -> Self {
        Self {
            client_id,
            http: reqwest::Client::new(),
            certs_url: GOOGLE_CERTS_URL.to_string(),
            keys_ttl: KEYS_TTL,
            cache: RwLock::new(None),
        }
    }

    async fn cached_jwk(&self, kid: &str) -> Option<Jwk> {
        let guard = self.cache.read().await;
        let cached = guard
            .as_ref()
            .filter(|c| c.fetched_at.elapsed() < self.keys_ttl)?;
        cached.set.keys.iter().find(|k| k.kid == kid).cloned()
    }

    async fn decoding_key(&self, kid: &str) -> AppResult<DecodingKey> {
        let jwk = match self.cached_jwk(kid).await {
            Some(jwk) => jwk,
            None => {
                let set = self.fetch_keys().await?;
                debug!(keys = set.keys.len(), "google certs refreshed");
                let found = set.keys.iter().find(|k| k.kid == kid).cloned();
                *self.cache.write().await = Some(CachedKeys {
                    set,
                    fetched_at: Instant::now(),
                });
                found.ok_or_else(invalid_token)?
            }
        };
        let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .context("google jwk to decoding key")?;
        Ok(key)
    }

    async fn fetch_keys(&self) -> anyhow::Result<JwkSet> {
        let set = self
            .http
            .get(&self.certs_url)
            .send()
            .await
            .context("fetch google certs")?
            .error_for_status()
            .context("google certs status")?
            .json::<JwkSet>()
            .await
            .context("decode google certs")?;
        Ok(set)
    }
}

#[async_trait]
impl GoogleVerifier for GoogleIdTokenVerifier {
    async fn verify(&self, id_token: &str) -> AppResult<GoogleProfile> {
        let client_id = self
            .client_id
            .as_deref()
            .context("google login is not configured (GOOGLE_CLIENT_ID)")?;

        let header = decode_header(id_token).map_err(|e| {
            warn!(error = %e, "malformed google id token");
            invalid_token()
        })?;
        let kid = header.kid.ok_or_else(invalid_token)?;
        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[client_id]);
        validation.set_issuer(&GOOGLE_ISSUERS);

        let data = decode::<GoogleProfile>(id_token, &key, &validation).map_err(|e| {
            warn!(error = %e, "google id token rejected");
            invalid_token()
        })?;
        debug!(email = ?data.claims.email, "google id token verified");
        Ok(data.claims)
    }
}
