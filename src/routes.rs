use std::sync::Arc;
use std::time::Duration;

use log::{error, Logger};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_header, with_status, Reply};

use crate::errors::{BackendError, Field, StoreError};

pub mod admin;
mod handlers;
mod rejection;
mod response;

pub use internal::*;

/// The maximum form data size to accept. This should be enforced by
/// the HTTP gateway, so on the Rust side it’s set to an unreasonably
/// large number.
const MAX_CONTENT_LENGTH: u64 = 2 * 1024 * 1024 * 1024;

/// The header the authenticating gateway puts the signed-in user's ID in.
pub const USER_HEADER: &str = "x-user-id";

const SERVER_TIMING_HEADER: &str = "server-timing";

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<Box<dyn Reply>, reject::Rejection> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let e = &r.error;
        error!(logger, "Backend error"; "context" => ?r.context, "error" => ?r.error, "status" => %status_code_for(e), "message" => %r.error);
        let flattened = r.flatten();

        return Ok(timed(with_status(json(&flattened), status_code_for(e)), r.elapsed));
    }

    Err(rej)
}

/// Adds a `server-timing` header reporting how long the handler took.
fn timed(reply: impl Reply + 'static, elapsed: Duration) -> Box<dyn Reply> {
    Box::new(with_header(
        reply,
        SERVER_TIMING_HEADER,
        format_server_timing(elapsed),
    ))
}

fn format_server_timing(duration: Duration) -> String {
    format!("handler;dur={}", duration.as_secs_f64() * 1000.0)
}

fn status_code_for(e: &BackendError) -> StatusCode {
    use BackendError::*;

    match e {
        PartsMissing(fields) if fields.contains(&Field::User) => StatusCode::UNAUTHORIZED,
        PartsMissing(_) | MalformedFormSubmission => StatusCode::BAD_REQUEST,
        WrongMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        SongUploadFailed { source } | ImageUploadFailed { source } => match source {
            StoreError::AlreadyExists { .. } => StatusCode::CONFLICT,
            _ => StatusCode::BAD_GATEWAY,
        },
        PersistenceFailed { .. } | Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

mod internal {
    use warp::filters::header;
    use warp::filters::multipart::form;
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::Filter;
    use warp::Reply;
    use warp::{path as p, post};

    use super::{handlers, MAX_CONTENT_LENGTH, USER_HEADER};
    use crate::environment::Environment;

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    pub fn make_upload_route(environment: Environment) -> Route {
        warp::any()
            .map(move || environment.clone())
            .and(p("songs"))
            .and(end())
            .and(post())
            .and(header::optional::<String>(USER_HEADER))
            .and(form().max_length(MAX_CONTENT_LENGTH))
            .and_then(handlers::upload)
            .boxed()
    }
}
