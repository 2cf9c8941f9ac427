use std::sync::Arc;

use log::Logger;
use sqlx::postgres::PgPool;

use crate::config::{get_parsed_variable, get_variable};
use crate::db::{Db, PgDb};
use crate::errors::SetupError;
use crate::store::{S3Store, Store, UploadOptions};

/// How long stored objects may be cached, unless configured otherwise.
pub const DEFAULT_CACHE_CONTROL_SECONDS: u32 = 3600;

pub type SafeDb = dyn Db + Send + Sync;
pub type SafeStore = dyn Store + Send + Sync;

/// Everything the upload workflow talks to.
#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub db: Arc<SafeDb>,
    pub songs: Arc<SafeStore>,
    pub images: Arc<SafeStore>,
    pub config: Config,
}

impl Environment {
    /// Connects to S3 and PostgreSQL as configured by the environment.
    pub async fn from_env(logger: Arc<Logger>) -> Result<Self, SetupError> {
        let client = S3Store::client_from_env()?;
        let songs = Arc::new(S3Store::from_env(client.clone(), "UPLOADER_SONGS_BUCKET"));
        let images = Arc::new(S3Store::from_env(client, "UPLOADER_IMAGES_BUCKET"));

        let connection_string = get_variable("UPLOADER_DB_CONNECTION_STRING");
        let pool = PgPool::connect(&connection_string).await?;
        let db = Arc::new(PgDb::new(pool));

        Ok(Environment::new(logger, db, songs, images, Config::from_env()))
    }

    pub fn new(
        logger: Arc<Logger>,
        db: Arc<SafeDb>,
        songs: Arc<SafeStore>,
        images: Arc<SafeStore>,
        config: Config,
    ) -> Self {
        Self {
            logger,
            db,
            songs,
            images,
            config,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub(crate) cache_control_seconds: u32,

    /// Whether objects uploaded by a submission are deleted again when a
    /// later step of the same submission fails.
    pub(crate) remove_orphans: bool,
}

impl Config {
    pub fn new(cache_control_seconds: u32, remove_orphans: bool) -> Self {
        Self {
            cache_control_seconds,
            remove_orphans,
        }
    }

    /// Reads `UPLOADER_CACHE_CONTROL_SECONDS` and `UPLOADER_REMOVE_ORPHANS`.
    pub fn from_env() -> Self {
        Config::new(
            get_parsed_variable("UPLOADER_CACHE_CONTROL_SECONDS", DEFAULT_CACHE_CONTROL_SECONDS),
            get_parsed_variable("UPLOADER_REMOVE_ORPHANS", false),
        )
    }

    /// Options for every upload: never replace an existing object.
    pub fn upload_options(&self) -> UploadOptions {
        UploadOptions {
            cache_control_seconds: self.cache_control_seconds,
            overwrite: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(DEFAULT_CACHE_CONTROL_SECONDS, false)
    }
}
