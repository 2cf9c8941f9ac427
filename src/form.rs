use bytes::Bytes;
use mime::Mime;

use crate::errors::{BackendError, Field};
use crate::song::UserId;

/// The only audio extension accepted for songs.
const SONG_EXTENSION: &str = ".mp3";

/// The content type songs are stored with when the client didn't send one.
const DEFAULT_SONG_CONTENT_TYPE: &str = "audio/mpeg";

/// A file picked by the user.
#[derive(Clone, Debug, PartialEq)]
pub struct FileUpload {
    /// The name of the file on the user's machine.
    pub file_name: String,

    /// The content type declared by the client, if any.
    pub content_type: Option<String>,

    /// The file contents.
    pub data: Bytes,
}

impl FileUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        FileUpload {
            file_name: file_name.into(),
            content_type,
            data: data.into(),
        }
    }
}

/// The values of the upload form. `Default` gives the empty form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UploadForm {
    pub title: String,
    pub author: String,
    pub song: Option<FileUpload>,
    pub image: Option<FileUpload>,
}

/// A form that passed validation, together with the user submitting it.
#[derive(Clone, Debug)]
pub struct ValidatedUpload {
    pub user_id: UserId,
    pub title: String,
    pub author: String,
    pub song: FileUpload,
    pub song_content_type: String,
    pub image: FileUpload,
    pub image_content_type: String,
}

impl UploadForm {
    /// Lists the required fields that are absent, in form order, followed
    /// by the user if nobody is signed in.
    pub fn missing_fields(&self, user: Option<&UserId>) -> Vec<Field> {
        let mut missing = vec![];

        if self.title.is_empty() {
            missing.push(Field::Title);
        }

        if self.author.is_empty() {
            missing.push(Field::Author);
        }

        if self.song.is_none() {
            missing.push(Field::Song);
        }

        if self.image.is_none() {
            missing.push(Field::Image);
        }

        if user.is_none() {
            missing.push(Field::User);
        }

        missing
    }

    /// Checks the form locally. Nothing here touches the network.
    pub fn validate(self, user: Option<UserId>) -> Result<ValidatedUpload, BackendError> {
        let UploadForm {
            title,
            author,
            song,
            image,
        } = self;

        match (song, image, user) {
            (Some(song), Some(image), Some(user_id)) if !title.is_empty() && !author.is_empty() => {
                let song_content_type = check_song(&song)?;
                let image_content_type = check_image(&image)?;

                Ok(ValidatedUpload {
                    user_id,
                    title,
                    author,
                    song,
                    song_content_type,
                    image,
                    image_content_type,
                })
            }
            (song, image, user) => {
                let form = UploadForm {
                    title,
                    author,
                    song,
                    image,
                };

                Err(BackendError::PartsMissing(form.missing_fields(user.as_ref())))
            }
        }
    }
}

fn check_song(song: &FileUpload) -> Result<String, BackendError> {
    if !song.file_name.to_lowercase().ends_with(SONG_EXTENSION) {
        return Err(BackendError::WrongMediaType {
            field: Field::Song,
            description: format!("{:?} is not an {} file", song.file_name, SONG_EXTENSION),
        });
    }

    Ok(song
        .content_type
        .clone()
        .unwrap_or_else(|| DEFAULT_SONG_CONTENT_TYPE.to_owned()))
}

fn check_image(image: &FileUpload) -> Result<String, BackendError> {
    let wrong_type = |description: String| BackendError::WrongMediaType {
        field: Field::Image,
        description,
    };

    let declared = image
        .content_type
        .as_deref()
        .ok_or_else(|| wrong_type(format!("{:?} has no content type", image.file_name)))?;

    let mime: Mime = declared
        .parse()
        .map_err(|_| wrong_type(format!("{:?} is not a MIME type", declared)))?;

    if mime.type_() != mime::IMAGE {
        return Err(wrong_type(format!("{} is not an image type", mime.essence_str())));
    }

    Ok(mime.essence_str().to_owned())
}
