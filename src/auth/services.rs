use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{
            ForgotPasswordRequest, GoogleLoginRequest, LoginRequest, RegisterRequest,
            ResetPasswordRequest,
        },
        jwt::{JwtKeys, SessionIdentity, TokenError},
        password::{hash_password_blocking, is_strong_enough, verify_password_blocking},
    },
    error::{AppError, AppResult},
    state::AppState,
    users::repo_types::{NewUser, Role, User},
};

pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If the email is registered, we will send password reset instructions.";
const BAD_CREDENTIALS: &str = "Incorrect email or password.";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn password_too_short() -> AppError {
    AppError::validation("Password must be at least 8 characters long.")
}

/// Creates a local account. Only an authenticated ADMIN may create another
/// ADMIN; everyone else gets ARTISTA.
pub async fn register(
    state: &AppState,
    payload: RegisterRequest,
    caller: Option<&SessionIdentity>,
) -> AppResult<User> {
    let role = payload.role.unwrap_or(Role::Artista);
    if role == Role::Admin && caller.map(|c| c.role) != Some(Role::Admin) {
        warn!(caller = ?caller.map(|c| c.id), "non-admin tried to create an admin");
        return Err(AppError::Forbidden(
            "Only administrators can create another administrator.".into(),
        ));
    }

    let name = payload.nome.trim().to_string();
    let contact = payload.contato.trim().to_string();
    let email = normalize_email(&payload.email);
    if name.is_empty() || email.is_empty() || payload.senha.is_empty() || contact.is_empty() {
        return Err(AppError::validation("All fields are required."));
    }
    if !is_valid_email(&email) {
        return Err(AppError::validation("Invalid email format."));
    }
    if !is_strong_enough(&payload.senha) {
        return Err(password_too_short());
    }

    if state.users.find_by_email(&email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(AppError::Conflict("Email already registered.".into()));
    }

    let password_hash = hash_password_blocking(payload.senha).await?;
    let user = state
        .users
        .create(NewUser {
            name,
            email,
            password_hash,
            contact,
            photo: None,
            role,
        })
        .await?;

    info!(user_id = user.id, email = %user.email, role = %user.role, "user registered");
    Ok(user)
}

/// Password login. Every failure looks the same to the caller.
pub async fn login(state: &AppState, payload: LoginRequest) -> AppResult<String> {
    let email = normalize_email(&payload.email);
    if email.is_empty() || payload.senha.is_empty() {
        return Err(AppError::validation("Email and password are required."));
    }

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(%email, "login unknown email");
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.into()));
    };

    let ok = verify_password_blocking(payload.senha, user.password_hash.clone()).await?;
    if !ok {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.into()));
    }

    let token = JwtKeys::new(&state.config.jwt).sign_session(&user)?;
    info!(user_id = user.id, "user logged in");
    Ok(token)
}

/// Google login; provisions an ARTISTA account on first sight of an email.
pub async fn login_google(state: &AppState, payload: GoogleLoginRequest) -> AppResult<(String, User)> {
    let id_token = payload.token.trim();
    if id_token.is_empty() {
        return Err(AppError::validation("Google token is required."));
    }

    let profile = state.google.verify(id_token).await?;
    let (Some(email), Some(name)) = (
        profile.email.as_deref().map(normalize_email).filter(|e| !e.is_empty()),
        profile.name.filter(|n| !n.trim().is_empty()),
    ) else {
        return Err(AppError::validation("Invalid Google token."));
    };

    let user = match state.users.find_by_email(&email).await? {
        Some(user) => user,
        None => {
            let user = state
                .users
                .create(NewUser {
                    name,
                    email,
                    password_hash: String::new(),
                    contact: String::new(),
                    photo: profile.picture,
                    role: Role::Artista,
                })
                .await?;
            info!(user_id = user.id, "user provisioned from google login");
            user
        }
    };

    let token = JwtKeys::new(&state.config.jwt).sign_google_session(&user)?;
    info!(user_id = user.id, "user logged in with google");
    Ok((token, user))
}

/// Mails a reset link. Unknown emails get the same answer as known ones.
pub async fn forgot_password(
    state: &AppState,
    payload: ForgotPasswordRequest,
) -> AppResult<&'static str> {
    let email = normalize_email(&payload.email);
    if !is_valid_email(&email) {
        return Err(AppError::validation("Invalid email."));
    }

    let Some(user) = state.users.find_by_email(&email).await? else {
        info!("password reset requested for unknown email");
        return Ok(FORGOT_PASSWORD_MESSAGE);
    };

    if user.is_oauth_only() {
        return Err(AppError::validation(
            "This account was created with Google. Use social login.",
        ));
    }

    let token = JwtKeys::new(&state.config.jwt).sign_reset(&user)?;
    state
        .mailer
        .send_password_reset(&user.email, &user.name, &token)
        .await?;

    info!(user_id = user.id, "password reset email dispatched");
    Ok(FORGOT_PASSWORD_MESSAGE)
}

pub async fn reset_password(state: &AppState, payload: ResetPasswordRequest) -> AppResult<()> {
    if payload.token.trim().is_empty() || payload.nova_senha.is_empty() {
        return Err(AppError::validation("Token and new password are required."));
    }
    if !is_strong_enough(&payload.nova_senha) {
        return Err(password_too_short());
    }

    let claims = JwtKeys::new(&state.config.jwt)
        .verify_reset(payload.token.trim())
        .map_err(|e| {
            warn!(error = %e, "reset token rejected");
            match e {
                TokenError::Expired => AppError::InvalidToken(
                    "Token expired. Request a new password reset.".into(),
                ),
                _ => AppError::InvalidToken("Invalid token.".into()),
            }
        })?;

    let Some(user) = state.users.find_by_id(claims.id).await? else {
        return Err(AppError::InvalidToken("Invalid or expired token.".into()));
    };

    let password_hash = hash_password_blocking(payload.nova_senha).await?;
    if !state.users.set_password_hash(user.id, &password_hash).await? {
        return Err(AppError::InvalidToken("Invalid or expired token.".into()));
    }

    info!(user_id = user.id, "password reset");
    Ok(())
}
