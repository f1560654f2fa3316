//! In-memory collaborators for tests: one store backing all repositories,
//! a recording mailer, a scripted Google verifier and a temp upload dir.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::async_trait;
use tempfile::TempDir;
use time::OffsetDateTime;

use crate::{
    artworks::{
        repo::ArtworkRepo,
        repo_types::{Artwork, ArtworkStatus, ArtworkWithArtist, NewArtwork},
    },
    auth::{
        google::{GoogleProfile, GoogleVerifier},
        jwt::tests::test_jwt_config,
        password::hash_password,
    },
    config::{AppConfig, UploadConfig},
    error::{AppError, AppResult},
    events::{
        repo::EventRepo,
        repo_types::{Event, EventChanges, EventWithCreator, NewEvent},
    },
    mail::Mailer,
    state::AppState,
    storage::LocalStorage,
    users::{
        repo::UserRepo,
        repo_types::{NewUser, ProfileChanges, Role, User},
    },
};

pub const TEST_BASE_URL: &str = "http://localhost:3333";
pub const TEST_PASSWORD: &str = "password1";

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: Vec<User>,
    artworks: Vec<Artwork>,
    events: Vec<Event>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .iter()
            .any(|u| Some(u.id) != except && u.email.eq_ignore_ascii_case(email))
    }

    fn user(&self, id: i64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }
}

fn email_conflict() -> AppError {
    AppError::Conflict("Email already in use.".into())
}

/// One mutex over all tables, so quota check and insert are atomic here too.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.lock().user(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, new: NewUser) -> AppResult<User> {
        let mut t = self.lock();
        if t.email_taken(&new.email, None) {
            return Err(email_conflict());
        }
        let user = User {
            id: t.next_id(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            contact: new.contact,
            photo: new.photo,
            bio: None,
            role: new.role,
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn update_profile(&self, id: i64, changes: ProfileChanges) -> AppResult<Option<User>> {
        let mut t = self.lock();
        if let Some(email) = &changes.email {
            if t.email_taken(email, Some(id)) {
                return Err(email_conflict());
            }
        }
        let Some(user) = t.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(contact) = changes.contact {
            user.contact = contact;
        }
        if let Some(bio) = changes.bio {
            user.bio = Some(bio);
        }
        Ok(Some(user.clone()))
    }

    async fn set_password_hash(&self, id: i64, password_hash: &str) -> AppResult<bool> {
        let mut t = self.lock();
        Ok(match t.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                true
            }
            None => false,
        })
    }

    async fn set_photo(&self, id: i64, url: &str) -> AppResult<bool> {
        let mut t = self.lock();
        Ok(match t.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.photo = Some(url.to_string());
                true
            }
            None => false,
        })
    }
}

#[async_trait]
impl ArtworkRepo for MemoryStore {
    async fn insert_within_quota(
        &self,
        artist_id: i64,
        new: NewArtwork,
        max_pending: i64,
    ) -> AppResult<Option<Artwork>> {
        let mut t = self.lock();
        if t.user(artist_id).is_none() {
            return Err(AppError::NotFound("Artist not found.".into()));
        }
        let pending = t
            .artworks
            .iter()
            .filter(|a| a.artist_id == artist_id && a.status == ArtworkStatus::Pending)
            .count() as i64;
        if pending >= max_pending {
            return Ok(None);
        }
        let artwork = Artwork {
            id: t.next_id(),
            title: new.title,
            description: new.description,
            image: new.image,
            category: new.category,
            exhibition_start: new.exhibition_start,
            exhibition_end: new.exhibition_end,
            status: ArtworkStatus::Pending,
            submitted_at: OffsetDateTime::now_utc(),
            artist_id,
        };
        t.artworks.push(artwork.clone());
        Ok(Some(artwork))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Artwork>> {
        Ok(self.lock().artworks.iter().find(|a| a.id == id).cloned())
    }

    async fn list(
        &self,
        artist_id: Option<i64>,
        status: Option<ArtworkStatus>,
    ) -> AppResult<Vec<ArtworkWithArtist>> {
        let t = self.lock();
        let mut rows: Vec<ArtworkWithArtist> = t
            .artworks
            .iter()
            .filter(|a| artist_id.map_or(true, |id| a.artist_id == id))
            .filter(|a| status.map_or(true, |s| a.status == s))
            .filter_map(|a| {
                t.user(a.artist_id).map(|u| ArtworkWithArtist {
                    artwork: a.clone(),
                    artist_name: u.name.clone(),
                    artist_email: u.email.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            (b.artwork.submitted_at, b.artwork.id).cmp(&(a.artwork.submitted_at, a.artwork.id))
        });
        Ok(rows)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut t = self.lock();
        let before = t.artworks.len();
        t.artworks.retain(|a| a.id != id);
        Ok(t.artworks.len() != before)
    }

    async fn update_status(&self, id: i64, status: ArtworkStatus) -> AppResult<Option<Artwork>> {
        let mut t = self.lock();
        Ok(t.artworks.iter_mut().find(|a| a.id == id).map(|a| {
            a.status = status;
            a.clone()
        }))
    }
}

fn with_creator(t: &Tables, e: &Event) -> Option<EventWithCreator> {
    t.user(e.created_by).map(|u| EventWithCreator {
        event: e.clone(),
        creator_name: u.name.clone(),
        creator_email: u.email.clone(),
    })
}

#[async_trait]
impl EventRepo for MemoryStore {
    async fn list(&self) -> AppResult<Vec<EventWithCreator>> {
        let t = self.lock();
        let mut rows: Vec<_> = t.events.iter().filter_map(|e| with_creator(&t, e)).collect();
        rows.sort_by_key(|r| (r.event.starts_at, r.event.id));
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<EventWithCreator>> {
        let t = self.lock();
        Ok(t.events
            .iter()
            .find(|e| e.id == id)
            .and_then(|e| with_creator(&t, e)))
    }

    async fn create(&self, new: NewEvent) -> AppResult<Event> {
        let mut t = self.lock();
        let event = Event {
            id: t.next_id(),
            title: new.title,
            description: new.description,
            location: new.location,
            image: new.image,
            starts_at: new.starts_at,
            ends_at: new.ends_at,
            kind: new.kind,
            created_by: new.created_by,
        };
        t.events.push(event.clone());
        Ok(event)
    }

    async fn update(&self, id: i64, changes: EventChanges) -> AppResult<Option<Event>> {
        let mut t = self.lock();
        let Some(e) = t.events.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        if let Some(v) = changes.title {
            e.title = v;
        }
        if let Some(v) = changes.description {
            e.description = v;
        }
        if let Some(v) = changes.location {
            e.location = v;
        }
        if let Some(v) = changes.image {
            e.image = Some(v);
        }
        if let Some(v) = changes.starts_at {
            e.starts_at = v;
        }
        if let Some(v) = changes.ends_at {
            e.ends_at = v;
        }
        if let Some(v) = changes.kind {
            e.kind = v;
        }
        Ok(Some(e.clone()))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut t = self.lock();
        let before = t.events.len();
        t.events.retain(|e| e.id != id);
        Ok(t.events.len() != before)
    }
}

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub name: String,
    pub token: String,
}

#[derive(Default)]
pub struct FakeMailer {
    sent: Mutex<Vec<SentMail>>,
    fail: AtomicBool,
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send_password_reset(&self, to: &str, name: &str, token: &str) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("smtp unavailable");
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.into(),
            name: name.into(),
            token: token.into(),
        });
        Ok(())
    }
}

/// Answers every token with a fixed profile, or rejects every token.
pub struct FakeGoogle {
    profile: Option<GoogleProfile>,
}

impl FakeGoogle {
    pub fn valid(email: &str, name: &str, picture: Option<&str>) -> Self {
        Self::profile(GoogleProfile {
            email: Some(email.into()),
            name: Some(name.into()),
            picture: picture.map(str::to_string),
        })
    }

    pub fn profile(profile: GoogleProfile) -> Self {
        Self {
            profile: Some(profile),
        }
    }

    pub fn rejecting() -> Self {
        Self { profile: None }
    }
}

#[async_trait]
impl GoogleVerifier for FakeGoogle {
    async fn verify(&self, _id_token: &str) -> AppResult<GoogleProfile> {
        self.profile
            .clone()
            .ok_or_else(|| AppError::Unauthorized("Invalid Google token.".into()))
    }
}

/// Handles on the fakes behind a [`fake_state`]. Dropping it removes the
/// upload directory.
pub struct Harness {
    dir: TempDir,
    mailer: Arc<FakeMailer>,
}

impl Harness {
    pub fn upload_dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn sent_mail(&self) -> Vec<SentMail> {
        self.mailer.sent.lock().unwrap().clone()
    }

    pub fn fail_mail(&self, fail: bool) {
        self.mailer.fail.store(fail, Ordering::SeqCst);
    }
}

pub async fn fake_state() -> (AppState, Harness) {
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::new(dir.path(), TEST_BASE_URL).await.unwrap();
    let store = Arc::new(MemoryStore::default());
    let mailer = Arc::new(FakeMailer::default());

    let config = AppConfig {
        database_url: "postgres://unused".into(),
        jwt: test_jwt_config(),
        google_client_id: None,
        mail: None,
        uploads: UploadConfig {
            dir: dir.path().to_path_buf(),
            public_base_url: TEST_BASE_URL.into(),
        },
    };

    let state = AppState {
        config: Arc::new(config),
        users: store.clone(),
        artworks: store.clone(),
        events: store,
        storage: Arc::new(storage),
        mailer: mailer.clone(),
        google: Arc::new(FakeGoogle::rejecting()),
    };
    (state, Harness { dir, mailer })
}

/// Inserts a user whose password is [`TEST_PASSWORD`].
pub async fn seed_user(state: &AppState, email: &str, role: Role) -> User {
    let name = email.split('@').next().unwrap_or(email).to_string();
    state
        .users
        .create(NewUser {
            name,
            email: email.to_lowercase(),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            contact: "999".into(),
            photo: None,
            role,
        })
        .await
        .unwrap()
}
