use bytes::{BufMut, Bytes};
use futures::stream::TryStreamExt;
use warp::multipart::{FormData, Part};

use crate::errors::BackendError;
use crate::form::{FileUpload, UploadForm};

/// Reads a multipart submission into an [`UploadForm`]. Unknown parts are
/// skipped and empty file parts count as absent.
pub async fn parse_upload(mut content: FormData) -> Result<UploadForm, BackendError> {
    let mut form = UploadForm::default();

    // parts arrive in order and each one has to be drained before the next
    while let Some(part) = content
        .try_next()
        .await
        .map_err(|_| BackendError::MalformedFormSubmission)?
    {
        let name = part.name().to_owned();

        match name.as_str() {
            "title" => form.title = part_as_string(part).await?,
            "author" => form.author = part_as_string(part).await?,
            "song" => form.song = part_as_file(part).await?,
            "image" => form.image = part_as_file(part).await?,
            _ => {}
        }
    }

    Ok(form)
}

/// Collects chunks of [`Part`].
pub async fn part_as_bytes(part: Part) -> Result<Bytes, BackendError> {
    let data = part
        .stream()
        .try_fold(Vec::new(), |mut data, chunk| async move {
            data.put(chunk);
            Ok::<_, warp::Error>(data)
        })
        .await
        .map_err(|_| BackendError::MalformedFormSubmission)?;

    Ok(Bytes::from(data))
}

async fn part_as_string(part: Part) -> Result<String, BackendError> {
    let data = part_as_bytes(part).await?;

    String::from_utf8(data.to_vec()).map_err(|_| BackendError::MalformedFormSubmission)
}

async fn part_as_file(part: Part) -> Result<Option<FileUpload>, BackendError> {
    let file_name = part.filename().unwrap_or_default().to_owned();
    let content_type = part.content_type().map(str::to_owned);
    let data = part_as_bytes(part).await?;

    if file_name.is_empty() && data.is_empty() {
        return Ok(None);
    }

    Ok(Some(FileUpload::new(file_name, content_type, data)))
}
