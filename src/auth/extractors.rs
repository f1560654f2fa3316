use std::marker::PhantomData;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::{
    auth::jwt::{JwtKeys, SessionIdentity},
    error::AppError,
    users::repo_types::Role,
};

/// Authenticated caller, taken from `Authorization: Bearer <session token>`.
#[derive(Debug)]
pub struct AuthUser(pub SessionIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header.".into()))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header.".into()))?;

        let keys = JwtKeys::from_ref(state);
        let identity = keys.verify_session(token).map_err(|e| {
            warn!(error = %e, "session token rejected");
            AppError::Unauthorized("Invalid or expired token.".into())
        })?;

        Ok(AuthUser(identity))
    }
}

/// Compile-time set of roles a route accepts.
pub trait RoleSet: Send + Sync + 'static {
    const ALLOWED: &'static [Role];
}

pub struct AdminOnly;
pub struct ArtistOnly;
pub struct AnyRole;

impl RoleSet for AdminOnly {
    const ALLOWED: &'static [Role] = &[Role::Admin];
}

impl RoleSet for ArtistOnly {
    const ALLOWED: &'static [Role] = &[Role::Artista];
}

impl RoleSet for AnyRole {
    const ALLOWED: &'static [Role] = &[Role::Admin, Role::Artista];
}

pub fn authorize(identity: &SessionIdentity, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&identity.role) {
        Ok(())
    } else {
        warn!(user_id = identity.id, role = %identity.role, "role not allowed");
        Err(AppError::Forbidden("Access denied.".into()))
    }
}

/// Authenticated caller whose role is in `R::ALLOWED`.
/// 401 without a valid session, 403 with the wrong role.
pub struct RequireRole<R: RoleSet>(pub SessionIdentity, pub PhantomData<R>);

impl<R: RoleSet> std::fmt::Debug for RequireRole<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RequireRole").field(&self.0).finish()
    }
}

pub type AdminUser = RequireRole<AdminOnly>;
pub type ArtistUser = RequireRole<ArtistOnly>;
pub type MemberUser = RequireRole<AnyRole>;

#[async_trait]
impl<S, R> FromRequestParts<S> for RequireRole<R>
where
    S: Send + Sync,
    R: RoleSet,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;
        authorize(&identity, R::ALLOWED)?;
        Ok(RequireRole(identity, PhantomData))
    }
}
