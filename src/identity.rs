use std::fmt;

use uuid::Uuid;

/// Prefix for keys in the songs bucket.
pub const SONG_NAMESPACE: &str = "song";

/// Prefix for keys in the images bucket.
pub const IMAGE_NAMESPACE: &str = "image";

/// An opaque token generated once per submission. Both objects of a
/// submission share it, so two uploads with the same title never collide.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UploadIdentity(Uuid);

impl UploadIdentity {
    pub fn generate() -> Self {
        UploadIdentity(Uuid::new_v4())
    }

    /// Builds the object key `<namespace>-<title>-<identity>`.
    pub fn key(&self, namespace: &str, title: &str) -> String {
        format!("{}-{}-{}", namespace, title, self)
    }

    pub fn song_key(&self, title: &str) -> String {
        self.key(SONG_NAMESPACE, title)
    }

    pub fn image_key(&self, title: &str) -> String {
        self.key(IMAGE_NAMESPACE, title)
    }
}

impl From<Uuid> for UploadIdentity {
    fn from(uuid: Uuid) -> Self {
        UploadIdentity(uuid)
    }
}

impl fmt::Display for UploadIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_simple())
    }
}
