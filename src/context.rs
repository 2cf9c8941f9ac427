use std::sync::Arc;

use log::{info, warn, Logger};

use crate::song::UserId;

/// A no-argument signal sent to the surroundings of the upload dialog.
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// Tells who is signed in.
pub trait Session: Send + Sync {
    /// Returns the current user, or `None` if nobody is signed in.
    fn current_user(&self) -> Option<UserId>;
}

/// A session whose user never changes.
#[derive(Clone, Debug, Default)]
pub struct StaticSession(Option<UserId>);

impl StaticSession {
    pub fn signed_in(user: UserId) -> Self {
        StaticSession(Some(user))
    }

    pub fn signed_out() -> Self {
        StaticSession(None)
    }
}

impl Session for StaticSession {
    fn current_user(&self) -> Option<UserId> {
        self.0.clone()
    }
}

/// Receives user-facing messages. Fire and forget.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);

    fn error(&self, message: &str);
}

/// A notifier that writes messages to the log.
pub struct LogNotifier {
    logger: Arc<Logger>,
}

impl LogNotifier {
    pub fn new(logger: Arc<Logger>) -> Self {
        LogNotifier { logger }
    }
}

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        info!(self.logger, "{}", message; "notification" => "success");
    }

    fn error(&self, message: &str) {
        warn!(self.logger, "{}", message; "notification" => "error");
    }
}

/// What the upload dialog needs from the page around it.
#[derive(Clone)]
pub struct UploadContext {
    pub session: Arc<dyn Session>,
    pub notifier: Arc<dyn Notifier>,

    /// Asks already-rendered views to fetch their data again.
    pub refresh: Callback,

    /// Closes the dialog.
    pub close: Callback,
}

impl UploadContext {
    pub fn new(
        session: Arc<dyn Session>,
        notifier: Arc<dyn Notifier>,
        refresh: Callback,
        close: Callback,
    ) -> Self {
        UploadContext {
            session,
            notifier,
            refresh,
            close,
        }
    }
}
