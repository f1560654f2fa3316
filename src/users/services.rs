use tracing::{info, warn};

use crate::{
    auth::services::{is_valid_email, normalize_email},
    error::{AppError, AppResult},
    images::services::{now_millis, validate, ImageUpload},
    state::AppState,
    users::{dto::UpdateProfileRequest, repo_types::{ProfileChanges, User}},
};

fn user_not_found() -> AppError {
    AppError::NotFound("User not found.".into())
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub async fn get_profile(state: &AppState, user_id: i64) -> AppResult<User> {
    state.users.find_by_id(user_id).await?.ok_or_else(user_not_found)
}

/// Applies the allow-listed fields only. Blank strings leave a field as is.
pub async fn update_profile(
    state: &AppState,
    user_id: i64,
    payload: UpdateProfileRequest,
) -> AppResult<User> {
    if payload.senha.is_some() {
        return Err(AppError::validation(
            "Password cannot be changed here. Use the password reset flow.",
        ));
    }

    let email = match non_blank(payload.email) {
        Some(raw) => {
            let email = normalize_email(&raw);
            if !is_valid_email(&email) {
                return Err(AppError::validation("Invalid email format."));
            }
            if let Some(other) = state.users.find_by_email(&email).await? {
                if other.id != user_id {
                    warn!(user_id, %email, "profile email collision");
                    return Err(AppError::Conflict("Email already in use.".into()));
                }
            }
            Some(email)
        }
        None => None,
    };

    let changes = ProfileChanges {
        name: non_blank(payload.nome),
        email,
        contact: non_blank(payload.contato),
        bio: payload.bio.map(|b| b.trim().to_string()),
    };

    let user = state
        .users
        .update_profile(user_id, changes)
        .await?
        .ok_or_else(user_not_found)?;
    info!(user_id, "profile updated");
    Ok(user)
}

/// Stores a new profile photo, points the user at it, then removes the
/// previous file when it lives in our storage.
pub async fn upload_profile_photo(
    state: &AppState,
    user_id: i64,
    upload: ImageUpload,
) -> AppResult<String> {
    let ext = validate(&upload)?;
    let current = get_profile(state, user_id).await?;

    let key = format!("profile-photos/user-{}-{}.{}", user_id, now_millis(), ext);
    state
        .storage
        .put_object(&key, upload.data, &upload.content_type)
        .await?;
    let url = state.storage.public_url(&key);

    if !state.users.set_photo(user_id, &url).await? {
        if let Err(e) = state.storage.delete_object(&key).await {
            warn!(error = ?e, user_id, %key, "failed to remove orphaned photo");
        }
        return Err(user_not_found());
    }

    if let Some(old_key) = current
        .photo
        .as_deref()
        .and_then(|old| state.storage.managed_key(old))
        .filter(|old_key| *old_key != key)
    {
        if let Err(e) = state.storage.delete_object(&old_key).await {
            warn!(error = ?e, user_id, %old_key, "failed to remove previous photo");
        }
    }

    info!(user_id, %url, "profile photo updated");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_support::{fake_state, seed_user},
        users::{
            repo::UserRepo,
            repo_types::{NewUser, Role},
        },
    };
    use bytes::Bytes;

    fn image(ct: &str, name: &str, len: usize) -> ImageUpload {
        ImageUpload {
            content_type: ct.into(),
            file_name: Some(name.into()),
            data: Bytes::from(vec![7u8; len]),
        }
    }

    #[tokio::test]
    async fn profile_of_vanished_user_is_not_found() {
        let (state, _h) = fake_state().await;
        let err = get_profile(&state, 999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_rejects_password_and_bad_email() {
        let (state, _h) = fake_state().await;
        let ana = seed_user(&state, "ana@x.com", Role::Artista).await;

        let err = update_profile(
            &state,
            ana.id,
            UpdateProfileRequest {
                senha: Some(serde_json::json!("newpassword")),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = update_profile(
            &state,
            ana.id,
            UpdateProfileRequest {
                email: Some("nope".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn update_lowercases_email_and_detects_collision() {
        let (state, _h) = fake_state().await;
        let ana = seed_user(&state, "ana@x.com", Role::Artista).await;
        seed_user(&state, "bob@x.com", Role::Artista).await;

        let user = update_profile(
            &state,
            ana.id,
            UpdateProfileRequest {
                nome: Some("Ana Maria".into()),
                email: Some(" Ana.Maria@X.com ".into()),
                bio: Some("Painter".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(user.email, "ana.maria@x.com");
        assert_eq!(user.name, "Ana Maria");
        assert_eq!(user.bio.as_deref(), Some("Painter"));
        assert_eq!(user.role, Role::Artista);

        let err = update_profile(
            &state,
            ana.id,
            UpdateProfileRequest {
                email: Some("BOB@x.com".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn two_megabyte_png_replaces_previous_photo() {
        let (state, h) = fake_state().await;
        let ana = seed_user(&state, "ana@x.com", Role::Artista).await;

        let first = upload_profile_photo(&state, ana.id, image("image/png", "a.png", 16))
            .await
            .unwrap();
        let first_key = state.storage.managed_key(&first).unwrap();
        assert!(h.upload_dir().join(&first_key).exists());

        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second =
            upload_profile_photo(&state, ana.id, image("image/png", "b.png", 2 * 1024 * 1024))
                .await
                .unwrap();
        let second_key = state.storage.managed_key(&second).unwrap();
        assert!(second_key.starts_with(&format!("profile-photos/user-{}-", ana.id)));
        assert!(second_key.ends_with(".png"));
        assert!(h.upload_dir().join(&second_key).exists());
        assert!(!h.upload_dir().join(&first_key).exists());

        let me = get_profile(&state, ana.id).await.unwrap();
        assert_eq!(me.photo.as_deref(), Some(second.as_str()));
    }

    #[tokio::test]
    async fn rejected_photos_leave_profile_untouched() {
        let (state, _h) = fake_state().await;
        let ana = seed_user(&state, "ana@x.com", Role::Artista).await;

        for bad in [
            image("image/jpeg", "big.jpg", 6 * 1024 * 1024),
            image("image/gif", "small.gif", 1024),
        ] {
            let err = upload_profile_photo(&state, ana.id, bad).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
        assert!(get_profile(&state, ana.id).await.unwrap().photo.is_none());
    }

    /// Finds users but loses them before the photo is saved.
    struct VanishingUsers(std::sync::Arc<dyn UserRepo>);

    #[axum::async_trait]
    impl UserRepo for VanishingUsers {
        async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
            self.0.find_by_id(id).await
        }
        async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
            self.0.find_by_email(email).await
        }
        async fn create(&self, new: NewUser) -> AppResult<User> {
            self.0.create(new).await
        }
        async fn update_profile(&self, id: i64, changes: ProfileChanges) -> AppResult<Option<User>> {
            self.0.update_profile(id, changes).await
        }
        async fn set_password_hash(&self, id: i64, password_hash: &str) -> AppResult<bool> {
            self.0.set_password_hash(id, password_hash).await
        }
        async fn set_photo(&self, _id: i64, _url: &str) -> AppResult<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn photo_for_user_deleted_mid_upload_is_cleaned_up() {
        let (mut state, h) = fake_state().await;
        let ana = seed_user(&state, "ana@x.com", Role::Artista).await;
        state.users = std::sync::Arc::new(VanishingUsers(state.users.clone()));

        let err = upload_profile_photo(&state, ana.id, image("image/png", "a.png", 16))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let photos = h.upload_dir().join("profile-photos");
        let left = std::fs::read_dir(&photos).map(|d| d.count()).unwrap_or(0);
        assert_eq!(left, 0);
    }

    #[tokio::test]
    async fn foreign_photo_url_is_left_alone() {
        let (state, _h) = fake_state().await;
        let ana = seed_user(&state, "ana@x.com", Role::Artista).await;
        state.users.set_photo(ana.id, "https://lh3.googleusercontent.com/a").await.unwrap();

        let url = upload_profile_photo(&state, ana.id, image("image/webp", "me.webp", 10))
            .await
            .unwrap();
        assert!(url.ends_with(".webp"));
    }
}
