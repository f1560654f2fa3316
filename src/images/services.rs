use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Upper bound for any uploaded image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// An image received from a client, fully buffered.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub content_type: String,
    pub file_name: Option<String>,
    pub data: Bytes,
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

fn unsupported_type() -> AppError {
    AppError::validation("Invalid file format. Use JPG, PNG or WEBP.")
}

fn too_large() -> AppError {
    AppError::validation("File too large. Maximum size: 5MB.")
}

// A body over the route limit surfaces as a 413 multipart error.
fn multipart_failure(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large()
    } else {
        err.into()
    }
}

/// Rejects anything that is not a JPEG, PNG or WEBP by MIME type.
pub fn check_content_type(content_type: &str) -> AppResult<&'static str> {
    ext_from_mime(content_type.trim().to_ascii_lowercase().as_str()).ok_or_else(unsupported_type)
}

/// Extension for the stored file: the declared one when it is an accepted
/// image extension, otherwise derived from the MIME type.
pub fn extension_for(upload: &ImageUpload) -> AppResult<String> {
    let from_mime = check_content_type(&upload.content_type)?;
    let declared = upload
        .file_name
        .as_deref()
        .and_then(|n| n.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| matches!(ext.as_str(), "jpg" | "jpeg" | "png" | "webp"));
    Ok(declared.unwrap_or_else(|| from_mime.to_string()))
}

/// Full validation of a buffered upload: type and size.
pub fn validate(upload: &ImageUpload) -> AppResult<String> {
    let ext = extension_for(upload)?;
    if upload.data.len() > MAX_IMAGE_BYTES {
        return Err(too_large());
    }
    Ok(ext)
}

/// Reads the first file field (or the field named `file`) of a multipart
/// body. The type is checked before reading and the size while streaming,
/// so an oversized file is rejected as soon as it crosses the limit.
pub async fn read_image_field(mp: &mut Multipart) -> AppResult<ImageUpload> {
    while let Some(mut field) = mp.next_field().await.map_err(multipart_failure)? {
        if field.file_name().is_none() && field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        check_content_type(&content_type)?;
        let file_name = field.file_name().map(str::to_string);

        let mut buf = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_failure)? {
            if buf.len() + chunk.len() > MAX_IMAGE_BYTES {
                return Err(too_large());
            }
            buf.extend_from_slice(&chunk);
        }

        debug!(%content_type, bytes = buf.len(), "image field received");
        return Ok(ImageUpload {
            content_type,
            file_name,
            data: buf.freeze(),
        });
    }
    Err(AppError::validation("No file was uploaded."))
}

pub(crate) fn now_millis() -> i128 {
    time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000
}

/// Stores an event illustration and returns its public URL.
pub async fn store_event_image(st: &AppState, upload: ImageUpload) -> AppResult<String> {
    let ext = validate(&upload)?;
    let key = format!("events/event-{}.{}", Uuid::new_v4(), ext);
    st.storage
        .put_object(&key, upload.data, &upload.content_type)
        .await?;
    Ok(st.storage.public_url(&key))
}

#[cfg(test)]
mod image_tests {
    use super::*;
    use crate::test_support::fake_state;

    fn upload(ct: &str, name: Option<&str>, len: usize) -> ImageUpload {
        ImageUpload {
            content_type: ct.into(),
            file_name: name.map(str::to_string),
            data: Bytes::from(vec![0u8; len]),
        }
    }

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("image/gif"), None);
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }

    #[test]
    fn declared_extension_wins_when_acceptable() {
        assert_eq!(extension_for(&upload("image/jpeg", Some("me.JPEG"), 1)).unwrap(), "jpeg");
        assert_eq!(extension_for(&upload("image/png", Some("me.exe"), 1)).unwrap(), "png");
        assert_eq!(extension_for(&upload("image/webp", None, 1)).unwrap(), "webp");
    }

    #[test]
    fn gif_is_rejected_even_when_small() {
        let err = validate(&upload("image/gif", Some("a.gif"), 10)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn six_megabyte_jpeg_is_rejected() {
        let err = validate(&upload("image/jpeg", Some("a.jpg"), 6 * 1024 * 1024)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn exactly_five_megabytes_is_accepted() {
        assert!(validate(&upload("image/png", None, MAX_IMAGE_BYTES)).is_ok());
    }

    #[tokio::test]
    async fn event_image_is_stored_under_events() {
        let (state, h) = fake_state().await;
        let url = store_event_image(&state, upload("image/png", Some("poster.png"), 32))
            .await
            .unwrap();
        assert!(url.starts_with("http://localhost:3333/uploads/events/event-"));
        assert!(url.ends_with(".png"));
        let key = state.storage.managed_key(&url).unwrap();
        assert!(h.upload_dir().join(key).exists());
    }
}
