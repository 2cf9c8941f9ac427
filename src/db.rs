use futures::future::BoxFuture;

use crate::errors::BackendError;
use crate::song::{Song, SongRecord};

#[cfg(test)]
pub(crate) mod mock;

pub trait Db {
    /// Writes a single song row. Failures carry the database's message.
    fn insert(&self, record: SongRecord) -> BoxFuture<Result<Song, BackendError>>;
}

pub use self::postgres::*;

mod postgres {
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use sqlx::{self, postgres::PgPool};
    use time::OffsetDateTime;

    use crate::errors::BackendError;
    use crate::song::{Song, SongRecord};

    pub struct PgDb {
        pool: PgPool,
    }

    impl PgDb {
        pub fn new(pool: PgPool) -> Self {
            PgDb { pool }
        }
    }

    // these can be simplified once async functions in traits are stabilized
    impl super::Db for PgDb {
        fn insert(&self, record: SongRecord) -> BoxFuture<Result<Song, BackendError>> {
            async move {
                let query = sqlx::query_as::<_, (i64, OffsetDateTime)>(include_str!(
                    "queries/insert_song.sql"
                ));

                let (id, created_at) = query
                    .bind(record.user_id.as_str())
                    .bind(&record.title)
                    .bind(&record.author)
                    .bind(&record.image_path)
                    .bind(&record.songs_path)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(Song::new(id, created_at, record))
            }
            .boxed()
        }
    }

    /// Keeps the database's own wording so it can be shown to the user.
    fn map_sqlx_error(error: sqlx::Error) -> BackendError {
        let message = match &error {
            sqlx::Error::Database(e) => e.message().to_owned(),
            other => other.to_string(),
        };

        BackendError::PersistenceFailed { message }
    }
}
