use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use log::{debug, error};

use crate::context::UploadContext;
use crate::environment::Environment;
use crate::errors::{BackendError, UNEXPECTED_MESSAGE};
use crate::form::{FileUpload, UploadForm};
use crate::song::Song;
use crate::workflow::upload_song;

/// Notification shown once a song has been stored.
pub const SUCCESS_MESSAGE: &str = "Song Uploaded!";

/// How a call to [`UploadModal::submit`] ended.
#[derive(Debug)]
pub enum Outcome {
    /// The song was stored; the form was reset and the dialog closed.
    Uploaded(Song),

    /// The submission failed and the user was told why.
    Failed(BackendError),

    /// Another submission was still running, so nothing happened.
    Busy,
}

/// Controller for the "add a song" dialog: holds the form values and the
/// in-progress flag and turns workflow results into notifications.
pub struct UploadModal {
    environment: Environment,
    context: UploadContext,
    form: Mutex<UploadForm>,
    loading: AtomicBool,
}

impl UploadModal {
    pub fn new(environment: Environment, context: UploadContext) -> Self {
        UploadModal {
            environment,
            context,
            form: Mutex::new(UploadForm::default()),
            loading: AtomicBool::new(false),
        }
    }

    /// Whether a submission is running. Inputs should be disabled while it
    /// is.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// A copy of the current form values.
    pub fn form(&self) -> UploadForm {
        self.lock_form().clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.lock_form().title = title.into();
    }

    pub fn set_author(&self, author: impl Into<String>) {
        self.lock_form().author = author.into();
    }

    pub fn set_song(&self, song: Option<FileUpload>) {
        self.lock_form().song = song;
    }

    pub fn set_image(&self, image: Option<FileUpload>) {
        self.lock_form().image = image;
    }

    /// Called when the dialog is shown or dismissed. Dismissing it discards
    /// the form; a submission already in flight keeps running.
    pub fn on_open_change(&self, open: bool) {
        if !open {
            self.reset();
            (self.context.close)();
        }
    }

    /// Runs one submission of the current form values. Every outcome
    /// except `Busy` produces exactly one notification, and the in-progress
    /// flag is clear again when this returns.
    pub async fn submit(&self) -> Outcome {
        let guard = match LoadingGuard::acquire(&self.loading) {
            Some(guard) => guard,
            None => {
                debug!(self.environment.logger, "Ignoring submission while another is in progress");
                return Outcome::Busy;
            }
        };

        let user = self.context.session.current_user();
        let form = self.form();

        let result = AssertUnwindSafe(upload_song(&self.environment, user, form))
            .catch_unwind()
            .await;

        match result {
            Ok(Ok(song)) => {
                (self.context.refresh)();
                drop(guard);
                self.context.notifier.success(SUCCESS_MESSAGE);
                self.reset();
                (self.context.close)();

                Outcome::Uploaded(song)
            }
            Ok(Err(e)) => {
                drop(guard);
                self.context.notifier.error(e.notification());

                Outcome::Failed(e)
            }
            Err(panic) => {
                drop(guard);
                let e = BackendError::from_panic(panic);
                error!(self.environment.logger, "Upload panicked"; "error" => %e);
                self.context.notifier.error(UNEXPECTED_MESSAGE);

                Outcome::Failed(e)
            }
        }
    }

    fn reset(&self) {
        *self.lock_form() = UploadForm::default();
    }

    fn lock_form(&self) -> MutexGuard<'_, UploadForm> {
        self.form.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds the in-progress flag and clears it when dropped, whichever way
/// the submission ends.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| LoadingGuard(flag))
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
