use std::sync::Arc;

use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt};
use rusoto_core::RusotoError;
use rusoto_s3::{
    DeleteObjectRequest, HeadObjectError, HeadObjectRequest, PutObjectRequest, S3Client,
    StreamingBody, S3,
};

use crate::errors::StoreError;

#[cfg(test)]
pub(crate) mod mock;

/// Options applied to a single upload.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UploadOptions {
    /// How long clients may cache the object, in seconds.
    pub cache_control_seconds: u32,

    /// Whether an existing object under the same key may be replaced.
    pub overwrite: bool,
}

impl UploadOptions {
    pub fn cache_control(&self) -> String {
        format!("max-age={}", self.cache_control_seconds)
    }
}

/// An object the store accepted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StoredObject {
    /// The path identifying the object within its bucket.
    pub path: String,
}

pub trait Store: Send + Sync {
    /// Deletes the given object.
    fn delete(&self, key: &str) -> BoxFuture<Result<(), StoreError>>;

    /// Saves the given data under the given key.
    fn save(
        &self,
        key: &str,
        content_type: String,
        raw: Bytes,
        options: UploadOptions,
    ) -> BoxFuture<Result<StoredObject, StoreError>>;
}

/// A store that saves its data to one S3 bucket.
pub struct S3Store {
    client: Arc<S3Client>,
    acl: String,
    bucket: String,
}

impl S3Store {
    /// Creates a new instance.
    pub fn new(client: Arc<S3Client>, acl: String, bucket: String) -> Self {
        Self {
            client,
            acl,
            bucket,
        }
    }

    /// Creates a client from the `S3_*` environment variables. Several
    /// stores can share it.
    pub fn client_from_env() -> Result<Arc<S3Client>, rusoto_core::request::TlsError> {
        use rusoto_core::request::HttpClient;
        use rusoto_core::Region;
        use rusoto_credential::StaticProvider;

        use crate::config::get_variable;

        let access_key = get_variable("S3_ACCESS_KEY");
        let secret_access_key = get_variable("S3_SECRET_ACCESS_KEY");

        let region = Region::Custom {
            name: get_variable("S3_REGION_NAME"),
            endpoint: get_variable("S3_ENDPOINT"),
        };

        Ok(Arc::new(S3Client::new_with(
            HttpClient::new()?,
            StaticProvider::new_minimal(access_key, secret_access_key),
            region,
        )))
    }

    /// Creates a store for the bucket named by `bucket_variable`.
    pub fn from_env(client: Arc<S3Client>, bucket_variable: &str) -> Self {
        use crate::config::get_variable;

        S3Store::new(
            client,
            get_variable("UPLOADER_S3_ACL"),
            get_variable(bucket_variable),
        )
    }
}

impl Store for S3Store {
    fn delete(&self, key: &str) -> BoxFuture<Result<(), StoreError>> {
        delete(self, key.to_owned()).boxed()
    }

    fn save(
        &self,
        key: &str,
        content_type: String,
        raw: Bytes,
        options: UploadOptions,
    ) -> BoxFuture<Result<StoredObject, StoreError>> {
        upload(self, key.to_owned(), content_type, raw, options).boxed()
    }
}

async fn delete(store: &S3Store, key: String) -> Result<(), StoreError> {
    let request = DeleteObjectRequest {
        bucket: store.bucket.clone(),
        key,
        ..Default::default()
    };

    store
        .client
        .delete_object(request)
        .await
        .map(|_| ())
        .map_err(|source| StoreError::DeleteFailed { source })
}

// S3 has no conditional put here, so the existence check and the write
// are two requests; a concurrent writer can still slip in between.
async fn upload(
    store: &S3Store,
    key: String,
    content_type: String,
    raw: Bytes,
    options: UploadOptions,
) -> Result<StoredObject, StoreError> {
    if !options.overwrite && exists(store, &key).await? {
        return Err(StoreError::AlreadyExists { key });
    }

    let request = PutObjectRequest {
        acl: Some(store.acl.clone()),
        body: Some(StreamingBody::from(raw.to_vec())),
        bucket: store.bucket.clone(),
        cache_control: Some(options.cache_control()),
        content_length: Some(raw.len() as i64),
        content_type: Some(content_type),
        key: key.clone(),
        ..Default::default()
    };

    match store.client.put_object(request).await {
        Ok(_) => Ok(StoredObject { path: key }),
        Err(source) => Err(StoreError::UploadFailed { source }),
    }
}

async fn exists(store: &S3Store, key: &str) -> Result<bool, StoreError> {
    let request = HeadObjectRequest {
        bucket: store.bucket.clone(),
        key: key.to_owned(),
        ..Default::default()
    };

    match store.client.head_object(request).await {
        Ok(_) => Ok(true),
        Err(RusotoError::Service(HeadObjectError::NoSuchKey(_))) => Ok(false),
        Err(RusotoError::Unknown(ref response)) if response.status.as_u16() == 404 => Ok(false),
        Err(source) => Err(StoreError::LookupFailed { source }),
    }
}
