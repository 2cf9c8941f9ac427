use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::context::{Callback, Notifier};
use crate::db::mock::MockDb;
use crate::environment::{Config, Environment};
use crate::form::{FileUpload, UploadForm};
use crate::store::mock::MockStore;

pub(crate) fn complete_form() -> UploadForm {
    UploadForm {
        title: "Midnight".to_owned(),
        author: "A. Roy".to_owned(),
        song: Some(FileUpload::new(
            "midnight.mp3",
            Some("audio/mpeg".to_owned()),
            &b"ID3\x03\x00"[..],
        )),
        image: Some(FileUpload::new(
            "cover.jpg",
            Some("image/jpeg".to_owned()),
            &b"\xff\xd8\xff"[..],
        )),
    }
}

pub(crate) fn environment(
    db: &Arc<MockDb>,
    songs: &Arc<MockStore>,
    images: &Arc<MockStore>,
    config: Config,
) -> Environment {
    Environment::new(
        Arc::new(log::discard()),
        db.clone(),
        songs.clone(),
        images.clone(),
        config,
    )
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Notification {
    Success(String),
    Error(String),
}

/// Keeps every notification it receives.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub(crate) notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.notifications
            .lock()
            .unwrap()
            .push(Notification::Success(message.to_owned()));
    }

    fn error(&self, message: &str) {
        self.notifications
            .lock()
            .unwrap()
            .push(Notification::Error(message.to_owned()));
    }
}

/// A callback that counts how often it fires.
pub(crate) fn counter() -> (Arc<AtomicUsize>, Callback) {
    let count = Arc::new(AtomicUsize::new(0));
    let callback_count = count.clone();

    let callback: Callback = Arc::new(move || {
        callback_count.fetch_add(1, Ordering::SeqCst);
    });

    (count, callback)
}
