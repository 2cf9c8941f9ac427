use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use bytes::Bytes;
use futures::channel::oneshot;
use futures::future::{BoxFuture, FutureExt};
use rusoto_core::request::HttpDispatchError;
use rusoto_core::RusotoError;

use crate::errors::StoreError;
use crate::store::{Store, StoredObject, UploadOptions};

/// An in-memory store that records every call.
#[derive(Default)]
pub(crate) struct MockStore {
    pub(crate) map: RwLock<HashMap<String, (String, Bytes)>>,
    pub(crate) saves: RwLock<Vec<(String, UploadOptions)>>,
    pub(crate) deletes: RwLock<Vec<String>>,
    failure: Option<Failure>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

/// How a failing `MockStore` rejects uploads.
#[derive(Clone, Copy, Debug)]
enum Failure {
    Conflict,
    Unreachable,
}

impl MockStore {
    pub fn new() -> Self {
        Default::default()
    }

    /// A store that rejects every upload as if the key already existed.
    pub fn failing() -> Self {
        MockStore::with_failure(Failure::Conflict)
    }

    /// A store whose server can't be reached.
    pub fn unreachable() -> Self {
        MockStore::with_failure(Failure::Unreachable)
    }

    /// A store that holds its first upload until `gate` fires or is dropped.
    pub fn gated(gate: oneshot::Receiver<()>) -> Self {
        MockStore {
            gate: Mutex::new(Some(gate)),
            ..Default::default()
        }
    }

    fn with_failure(failure: Failure) -> Self {
        MockStore {
            failure: Some(failure),
            ..Default::default()
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.read().unwrap().len()
    }

    pub fn saved_keys(&self) -> Vec<String> {
        self.saves
            .read()
            .unwrap()
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.deletes.read().unwrap().clone()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.read().unwrap().contains_key(key)
    }
}

impl Store for MockStore {
    fn delete(&self, key: &str) -> BoxFuture<Result<(), StoreError>> {
        mock_delete(self, key.to_owned()).boxed()
    }

    fn save(
        &self,
        key: &str,
        content_type: String,
        raw: Bytes,
        options: UploadOptions,
    ) -> BoxFuture<Result<StoredObject, StoreError>> {
        mock_save(self, key.to_owned(), content_type, raw, options).boxed()
    }
}

async fn mock_delete(store: &MockStore, key: String) -> Result<(), StoreError> {
    store.map.write().unwrap().remove(&key);
    store.deletes.write().unwrap().push(key);

    Ok(())
}

async fn mock_save(
    store: &MockStore,
    key: String,
    content_type: String,
    raw: Bytes,
    options: UploadOptions,
) -> Result<StoredObject, StoreError> {
    let gate = store.gate.lock().unwrap().take();

    if let Some(gate) = gate {
        gate.await.ok();
    }

    store.saves.write().unwrap().push((key.clone(), options));

    match store.failure {
        Some(Failure::Conflict) => return Err(StoreError::AlreadyExists { key }),
        Some(Failure::Unreachable) => {
            return Err(StoreError::UploadFailed {
                source: RusotoError::HttpDispatch(HttpDispatchError::new(
                    "connection refused".to_owned(),
                )),
            })
        }
        None => {}
    }

    let mut map = store.map.write().unwrap();

    if !options.overwrite && map.contains_key(&key) {
        return Err(StoreError::AlreadyExists { key });
    }

    map.insert(key.clone(), (content_type, raw));

    Ok(StoredObject { path: key })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(overwrite: bool) -> UploadOptions {
        UploadOptions {
            cache_control_seconds: 3600,
            overwrite,
        }
    }

    #[tokio::test]
    async fn existing_keys_are_not_replaced() {
        let store = MockStore::new();

        store
            .save("song-a-1", "audio/mpeg".to_owned(), Bytes::from_static(b"first"), options(false))
            .await
            .expect("first save");

        let result = store
            .save("song-a-1", "audio/mpeg".to_owned(), Bytes::from_static(b"second"), options(false))
            .await;

        assert!(matches!(result, Err(StoreError::AlreadyExists { ref key }) if key == "song-a-1"));
        assert_eq!(
            store.map.read().unwrap().get("song-a-1").map(|(_, raw)| raw.clone()),
            Some(Bytes::from_static(b"first"))
        );
    }

    #[tokio::test]
    async fn unreachable_store_fails_without_conflict() {
        let store = MockStore::unreachable();

        let result = store
            .save("k", "image/png".to_owned(), Bytes::from_static(b"data"), options(false))
            .await;

        assert!(matches!(result, Err(StoreError::UploadFailed { .. })));
        assert!(!store.contains("k"));
    }

    #[tokio::test]
    async fn overwrite_replaces() {
        let store = MockStore::new();

        for body in &[&b"first"[..], &b"second"[..]] {
            store
                .save("k", "image/png".to_owned(), Bytes::copy_from_slice(body), options(true))
                .await
                .expect("save");
        }

        assert_eq!(
            store.map.read().unwrap().get("k").map(|(_, raw)| raw.clone()),
            Some(Bytes::from_static(b"second"))
        );
    }
}
