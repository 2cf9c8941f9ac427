use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use dotenv::dotenv;
use structopt::StructOpt;

use log::{debug, initialize_logger};
use uploader::context::{Callback, LogNotifier, StaticSession, UploadContext};
use uploader::environment::Environment;
use uploader::form::FileUpload;
use uploader::modal::{Outcome, UploadModal};
use uploader::song::UserId;

#[derive(Debug, StructOpt)]
#[structopt(name = "upload-song", about = "Upload a song and its cover image")]
struct Opt {
    /// The song title
    #[structopt(long)]
    title: String,

    /// The song author
    #[structopt(long)]
    author: String,

    /// The .mp3 file to upload
    #[structopt(long, parse(from_os_str))]
    song: PathBuf,

    /// The cover image to upload
    #[structopt(long, parse(from_os_str))]
    image: PathBuf,

    /// The image content type, if it can't be guessed from the extension
    #[structopt(long)]
    image_type: Option<String>,

    /// The ID of the user the song belongs to
    #[structopt(long)]
    user: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let opt = Opt::from_args();

    let logger = Arc::new(initialize_logger());
    let environment = Environment::from_env(logger.clone()).await?;

    let song = read_file(&opt.song, None).await?;
    let image_type = match opt.image_type {
        Some(image_type) => Some(image_type),
        None => guess_image_type(&opt.image),
    };
    let image = read_file(&opt.image, image_type).await?;

    let noop: Callback = Arc::new(|| {});
    let close_logger = logger.clone();
    let close: Callback = Arc::new(move || debug!(close_logger, "Dialog closed"));

    let context = UploadContext::new(
        Arc::new(StaticSession::signed_in(UserId::new(opt.user))),
        Arc::new(LogNotifier::new(logger.clone())),
        noop,
        close,
    );

    let modal = UploadModal::new(environment, context);
    modal.set_title(opt.title);
    modal.set_author(opt.author);
    modal.set_song(Some(song));
    modal.set_image(Some(image));

    match modal.submit().await {
        Outcome::Uploaded(song) => {
            println!("{}", serde_json::to_string_pretty(&song)?);
            Ok(())
        }
        Outcome::Failed(_) | Outcome::Busy => process::exit(1),
    }
}

async fn read_file(path: &Path, content_type: Option<String>) -> Result<FileUpload, Box<dyn Error>> {
    let data = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(FileUpload::new(file_name, content_type, data))
}

fn guess_image_type(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?.to_lowercase();

    let essence = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => return None,
    };

    Some(essence.to_owned())
}
