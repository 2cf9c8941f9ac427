use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures::FutureExt;
use log::{debug, error};
use warp::{
    filters::multipart::FormData,
    http::StatusCode,
    reject,
    reply::{json, with_status, Reply},
};

use super::timed;
use crate::environment::Environment;
use crate::errors::BackendError;
use crate::io::parse_upload;
use crate::modal::SUCCESS_MESSAGE;
use crate::routes::{
    rejection::{Context, Rejection},
    response::SuccessResponse,
};
use crate::song::{Song, UserId};
use crate::workflow::upload_song;

type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

pub async fn upload(
    environment: Environment,
    user: Option<String>,
    content: FormData,
) -> RouteResult {
    let start = Instant::now();
    let logger = environment.logger.clone();

    let context = Context::upload(user.clone());
    let error_handler = |e: BackendError| Rejection::reject(context.clone(), e, start.elapsed());

    let result = AssertUnwindSafe(parse_and_upload(&environment, user, content))
        .catch_unwind()
        .await;

    let song = match result {
        Ok(result) => result.map_err(&error_handler)?,
        Err(panic) => {
            let e = BackendError::from_panic(panic);
            error!(logger, "Upload panicked"; "error" => %e);
            return Err(error_handler(e));
        }
    };

    debug!(logger, "Sending response..."; "id" => song.id());
    let response = SuccessResponse::Upload {
        message: SUCCESS_MESSAGE,
        song,
    };

    Ok(timed(with_status(json(&response), StatusCode::CREATED), start.elapsed()))
}

async fn parse_and_upload(
    environment: &Environment,
    user: Option<String>,
    content: FormData,
) -> Result<Song, BackendError> {
    debug!(environment.logger, "Parsing submission...");
    let form = parse_upload(content).await?;

    let user = user.filter(|id| !id.is_empty()).map(UserId::new);
    upload_song(environment, user, form).await
}
