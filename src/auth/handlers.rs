use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            ForgotPasswordRequest, GoogleLoginRequest, GoogleLoginResponse, LoginRequest,
            MessageResponse, RegisterRequest, RegisteredUser, ResetPasswordRequest,
            TokenResponse,
        },
        extractors::{AdminUser, RequireRole},
        services,
    },
    error::AppResult,
    extract::AppJson,
    state::AppState,
    users::repo_types::Role,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/register-admin", post(register_admin))
        .route("/auth/login", post(login))
        .route("/auth/login-google", post(login_google))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisteredUser>)> {
    let user = services::register(&state, payload, None).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Same as `register` but run by an ADMIN; the role defaults to ADMIN here.
#[instrument(skip_all)]
pub async fn register_admin(
    State(state): State<AppState>,
    RequireRole(admin, _): AdminUser,
    AppJson(mut payload): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisteredUser>)> {
    payload.role.get_or_insert(Role::Admin);
    let user = services::register(&state, payload, Some(&admin)).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = services::login(&state, payload).await?;
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state, payload))]
pub async fn login_google(
    State(state): State<AppState>,
    AppJson(payload): AppJson<GoogleLoginRequest>,
) -> AppResult<Json<GoogleLoginResponse>> {
    let (token, user) = services::login_google(&state, payload).await?;
    Ok(Json(GoogleLoginResponse {
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let message = services::forgot_password(&state, payload).await?;
    Ok(Json(MessageResponse::new(message)))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    services::reset_password(&state, payload).await?;
    Ok(Json(MessageResponse::new("Password reset successfully.")))
}
