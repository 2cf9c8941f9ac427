use std::sync::Arc;

use log::{debug, error, o, Logger};

use crate::environment::{Environment, SafeStore};
use crate::errors::BackendError;
use crate::form::{FileUpload, UploadForm};
use crate::identity::UploadIdentity;
use crate::song::{Song, SongRecord, UserId};
use crate::store::StoredObject;

/// Validates the form, stores the audio file, then the cover image, then
/// writes the song row. Each step starts only after the previous one
/// succeeded; the first failure ends the run.
pub async fn upload_song(
    environment: &Environment,
    user: Option<UserId>,
    form: UploadForm,
) -> Result<Song, BackendError> {
    let upload = form.validate(user)?;

    let identity = UploadIdentity::generate();
    let logger = environment.logger.new(o!(
        "upload" => identity.to_string(),
        "user" => upload.user_id.to_string()
    ));

    debug!(logger, "Uploading song...");
    let song = save_song(
        environment,
        identity.song_key(&upload.title),
        upload.song,
        upload.song_content_type,
    )
    .await
    .map_err(|e| log_failure(&logger, e))?;

    debug!(logger, "Uploading image..."; "song_path" => &song.path);
    let image = match save_image(
        environment,
        identity.image_key(&upload.title),
        upload.image,
        upload.image_content_type,
    )
    .await
    {
        Ok(image) => image,
        Err(e) => {
            remove_orphans(environment, &logger, &[(&environment.songs, &song)]).await;
            return Err(log_failure(&logger, e));
        }
    };

    debug!(logger, "Writing metadata to database..."; "image_path" => &image.path);
    let record = SongRecord {
        user_id: upload.user_id,
        title: upload.title,
        author: upload.author,
        image_path: image.path.clone(),
        songs_path: song.path.clone(),
    };

    match environment.db.insert(record).await {
        Ok(created) => {
            debug!(logger, "Song created"; "id" => created.id());
            Ok(created)
        }
        Err(e) => {
            remove_orphans(
                environment,
                &logger,
                &[(&environment.songs, &song), (&environment.images, &image)],
            )
            .await;
            Err(log_failure(&logger, e))
        }
    }
}

async fn save_song(
    environment: &Environment,
    key: String,
    file: FileUpload,
    content_type: String,
) -> Result<StoredObject, BackendError> {
    environment
        .songs
        .save(&key, content_type, file.data, environment.config.upload_options())
        .await
        .map_err(|source| BackendError::SongUploadFailed { source })
}

async fn save_image(
    environment: &Environment,
    key: String,
    file: FileUpload,
    content_type: String,
) -> Result<StoredObject, BackendError> {
    environment
        .images
        .save(&key, content_type, file.data, environment.config.upload_options())
        .await
        .map_err(|source| BackendError::ImageUploadFailed { source })
}

/// Deletes objects left behind by a failed submission, if so configured.
/// Failures here are only logged; the caller reports the original error.
async fn remove_orphans(
    environment: &Environment,
    logger: &Logger,
    orphans: &[(&Arc<SafeStore>, &StoredObject)],
) {
    if !environment.config.remove_orphans {
        debug!(logger, "Leaving uploaded objects in place"; "count" => orphans.len());
        return;
    }

    for (store, object) in orphans {
        debug!(logger, "Removing orphaned object..."; "path" => &object.path);

        if let Err(e) = store.delete(&object.path).await {
            error!(logger, "Failed to remove orphaned object"; "path" => &object.path, "error" => %e);
        }
    }
}

fn log_failure(logger: &Logger, e: BackendError) -> BackendError {
    error!(logger, "Upload failed"; "error" => ?e, "message" => %e);
    e
}
