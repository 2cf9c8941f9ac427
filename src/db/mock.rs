use std::sync::RwLock;

use futures::future::{BoxFuture, FutureExt};
use time::OffsetDateTime;

use crate::db::Db;
use crate::errors::BackendError;
use crate::song::{Song, SongRecord};

/// How a `MockDb` answers inserts.
#[derive(Clone, Debug)]
pub(crate) enum Behaviour {
    Accept,
    Reject(String),
    Panic,
}

/// An in-memory database that records every insert it's asked for.
pub(crate) struct MockDb {
    pub(crate) inserts: RwLock<Vec<SongRecord>>,
    behaviour: Behaviour,
}

impl MockDb {
    pub fn new() -> Self {
        MockDb::with_behaviour(Behaviour::Accept)
    }

    pub fn rejecting(message: impl Into<String>) -> Self {
        MockDb::with_behaviour(Behaviour::Reject(message.into()))
    }

    pub fn panicking() -> Self {
        MockDb::with_behaviour(Behaviour::Panic)
    }

    fn with_behaviour(behaviour: Behaviour) -> Self {
        MockDb {
            inserts: RwLock::new(vec![]),
            behaviour,
        }
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.read().unwrap().len()
    }

    pub fn records(&self) -> Vec<SongRecord> {
        self.inserts.read().unwrap().clone()
    }
}

impl Db for MockDb {
    fn insert(&self, record: SongRecord) -> BoxFuture<Result<Song, BackendError>> {
        mock_insert(self, record).boxed()
    }
}

async fn mock_insert(db: &MockDb, record: SongRecord) -> Result<Song, BackendError> {
    db.inserts.write().unwrap().push(record.clone());

    match &db.behaviour {
        Behaviour::Accept => {
            let id = db.insert_count() as i64;
            Ok(Song::new(id, OffsetDateTime::now_utc(), record))
        }
        Behaviour::Reject(message) => Err(BackendError::PersistenceFailed {
            message: message.clone(),
        }),
        Behaviour::Panic => panic!("connection reset"),
    }
}
