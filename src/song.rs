use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The identifier of a signed-in user, as issued by the session provider.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single song before it's written to the database.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SongRecord {
    /// The user who uploaded it. Always taken from the session.
    pub user_id: UserId,

    /// The title provided.
    pub title: String,

    /// The author provided.
    pub author: String,

    /// The key of the cover image in the images bucket.
    pub image_path: String,

    /// The key of the audio file in the songs bucket.
    pub songs_path: String,
}

/// A single song in the database.
#[derive(Clone, Debug, Serialize)]
pub struct Song {
    /// The ID of the song.
    id: i64,

    /// The date and time it was created.
    created_at: OffsetDateTime,

    /// The submitted metadata and storage keys.
    #[serde(flatten)]
    record: SongRecord,
}

impl Song {
    pub fn new(id: i64, created_at: OffsetDateTime, record: SongRecord) -> Self {
        Song {
            id,
            created_at,
            record,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub fn record(&self) -> &SongRecord {
        &self.record
    }
}
