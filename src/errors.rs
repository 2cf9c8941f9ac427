use std::any::Any;
use std::fmt;

use rusoto_core::RusotoError;
use rusoto_s3::{DeleteObjectError, HeadObjectError, PutObjectError};
use serde::Serialize;
use thiserror::Error;

/// Notification shown when a submission is incomplete.
pub const MISSING_FIELDS_MESSAGE: &str = "Missing fields.";

/// Notification shown when a submission couldn't be read at all.
pub const MALFORMED_FORM_MESSAGE: &str = "Could not read the submitted form.";

/// Notification shown when a file has the wrong type.
pub const WRONG_MEDIA_TYPE_MESSAGE: &str = "Unsupported file type.";

/// Notification shown when the audio file could not be stored.
pub const SONG_UPLOAD_FAILED_MESSAGE: &str = "Failed to upload your song.";

/// Notification shown when the cover image could not be stored.
pub const IMAGE_UPLOAD_FAILED_MESSAGE: &str = "Failed to upload your image.";

/// Notification shown for anything the workflow doesn't model.
pub const UNEXPECTED_MESSAGE: &str = "Something went wrong.";

/// A field of the upload form, plus the signed-in user it implicitly
/// requires.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    Author,
    Song,
    Image,
    User,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Title => "title",
            Field::Author => "author",
            Field::Song => "song",
            Field::Image => "image",
            Field::User => "user",
        };

        f.write_str(name)
    }
}

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Represents a submission lacking required fields or a signed-in user.
    #[error("Missing parts: {}", join_fields(.0))]
    PartsMissing(Vec<Field>),

    /// Represents a file whose type can't be accepted for its field.
    #[error("Wrong media type for {field}: {description}")]
    WrongMediaType { field: Field, description: String },

    /// Represents a form submission that couldn't be read.
    #[error("Malformed form submission")]
    MalformedFormSubmission,

    /// Represents a failure to store the audio file.
    #[error("Failed to upload song")]
    SongUploadFailed { source: StoreError },

    /// Represents a failure to store the cover image.
    #[error("Failed to upload image")]
    ImageUploadFailed { source: StoreError },

    /// Represents a failure to write the metadata row. The message is the
    /// database's own.
    #[error("{message}")]
    PersistenceFailed { message: String },

    /// Represents any failure outside the modelled ones.
    #[error("Unexpected failure: {0}")]
    Unexpected(String),
}

impl BackendError {
    /// Returns the text to show the user for this error.
    pub fn notification(&self) -> &str {
        use BackendError::*;

        match self {
            PartsMissing(_) => MISSING_FIELDS_MESSAGE,
            MalformedFormSubmission => MALFORMED_FORM_MESSAGE,
            WrongMediaType { .. } => WRONG_MEDIA_TYPE_MESSAGE,
            SongUploadFailed { .. } => SONG_UPLOAD_FAILED_MESSAGE,
            ImageUploadFailed { .. } => IMAGE_UPLOAD_FAILED_MESSAGE,
            PersistenceFailed { message } => message.as_str(),
            Unexpected(_) => UNEXPECTED_MESSAGE,
        }
    }

    /// Turns the payload of a caught panic into an [`BackendError::Unexpected`].
    pub fn from_panic(panic: Box<dyn Any + Send>) -> Self {
        let message = if let Some(message) = panic.downcast_ref::<&str>() {
            (*message).to_owned()
        } else if let Some(message) = panic.downcast_ref::<String>() {
            message.clone()
        } else {
            "unknown panic".to_owned()
        };

        BackendError::Unexpected(message)
    }
}

/// Enumerates errors returned by the store subsystem.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Represents an attempt to write over an existing object.
    #[error("Object {key} already exists")]
    AlreadyExists { key: String },

    /// Represents an error returned by the remote server when uploading.
    #[error("Upload error")]
    UploadFailed { source: RusotoError<PutObjectError> },

    /// Represents an error returned while checking for an existing object.
    #[error("Lookup error")]
    LookupFailed { source: RusotoError<HeadObjectError> },

    /// Represents an error returned by the remote server when deleting.
    #[error("Delete error")]
    DeleteFailed { source: RusotoError<DeleteObjectError> },
}

/// Enumerates errors returned while wiring up the service.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Represents a failure to create the HTTP client for S3.
    #[error("Failed to create S3 client")]
    S3Client {
        #[from]
        source: rusoto_core::request::TlsError,
    },

    /// Represents a failure to connect to the database.
    #[error("Failed to connect to database")]
    Database {
        #[from]
        source: sqlx::Error,
    },
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
