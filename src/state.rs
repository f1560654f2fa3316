use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::{
    artworks::repo::{ArtworkRepo, PgArtworkRepo},
    auth::google::{GoogleIdTokenVerifier, GoogleVerifier},
    config::AppConfig,
    events::repo::{EventRepo, PgEventRepo},
    mail::{Mailer, SmtpMailer},
    storage::{LocalStorage, StorageClient},
    users::repo::{PgUserRepo, UserRepo},
};

/// Everything a handler can reach. Collaborators sit behind traits so tests
/// swap in in-memory versions.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub artworks: Arc<dyn ArtworkRepo>,
    pub events: Arc<dyn EventRepo>,
    pub storage: Arc<dyn StorageClient>,
    pub mailer: Arc<dyn Mailer>,
    pub google: Arc<dyn GoogleVerifier>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;
        info!("database ready");

        let storage = LocalStorage::new(config.uploads.dir.clone(), &config.uploads.public_base_url).await?;
        info!(dir = %storage.root().display(), "upload storage ready");

        if config.google_client_id.is_none() {
            info!("GOOGLE_CLIENT_ID not set; google login disabled");
        }
        if config.mail.is_none() {
            info!("EMAIL_MUSEUM / EMAIL_PASS not set; password reset mail disabled");
        }

        Ok(Self {
            users: Arc::new(PgUserRepo::new(db.clone())),
            artworks: Arc::new(PgArtworkRepo::new(db.clone())),
            events: Arc::new(PgEventRepo::new(db)),
            storage: Arc::new(storage),
            mailer: Arc::new(SmtpMailer::new(config.mail.clone())),
            google: Arc::new(GoogleIdTokenVerifier::new(config.google_client_id.clone())),
            config,
        })
    }
}
