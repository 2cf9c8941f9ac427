use std::time::Duration;

use serde::Serialize;
use warp::reject;

use crate::errors::BackendError;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: BackendError,
    /// Time spent in the handler before it gave up.
    pub(crate) elapsed: Duration,
}

impl Rejection {
    pub fn new(context: Context, error: BackendError, elapsed: Duration) -> Self {
        Rejection {
            context,
            error,
            elapsed,
        }
    }

    /// Wraps the error so warp can carry it to `format_rejection`.
    pub fn reject(context: Context, error: BackendError, elapsed: Duration) -> reject::Rejection {
        reject::custom(Rejection::new(context, error, elapsed))
    }

    /// The body sent to the client: the context plus the same message the
    /// upload dialog would show.
    pub fn flatten(&self) -> FlattenedRejection {
        FlattenedRejection {
            context: self.context.clone(),
            message: self.error.notification().to_owned(),
        }
    }
}

impl reject::Reject for Rejection {}

#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    #[serde(flatten)]
    pub(crate) context: Context,
    pub(crate) message: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Context {
    Upload { user: Option<String> },
}

impl Context {
    pub fn upload(user: Option<String>) -> Context {
        Context::Upload { user }
    }
}
