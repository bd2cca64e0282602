//! Document-store output (MongoDB).
//!
//! Each collected post becomes one document with `postText`, `postDate`,
//! `comments` and `commenters`. Inserts append; nothing is deduplicated across
//! runs.

use crate::config::DocumentStoreTarget;
use crate::error::SinkWriteError;
use crate::models::NormalizedPost;
use mongodb::Client;
use tracing::{info, instrument};

/// Handle to the MongoDB deployment. Cheap to clone.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
}

impl MongoStore {
    /// Parse `uri` and prepare a client. Connections are opened lazily on first use.
    pub async fn connect(uri: &str) -> Result<Self, SinkWriteError> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self { client })
    }

    /// Insert all posts into `target`, one document each.
    ///
    /// # Returns
    ///
    /// The number of inserted documents. An empty slice inserts nothing and
    /// returns `0` without contacting the server.
    ///
    /// # Errors
    ///
    /// [`SinkWriteError::Mongo`] when the server is unreachable or rejects
    /// the insert.
    #[instrument(level = "info", skip_all, fields(database = %target.database, collection = %target.collection))]
    pub async fn insert_posts(
        &self,
        posts: &[NormalizedPost],
        target: &DocumentStoreTarget,
    ) -> Result<usize, SinkWriteError> {
        if posts.is_empty() {
            return Ok(0);
        }
        let collection = self
            .client
            .database(&target.database)
            .collection::<NormalizedPost>(&target.collection);

        let result = collection.insert_many(posts).await?;
        let inserted = result.inserted_ids.len();
        info!(inserted, "Saved posts to MongoDB");
        Ok(inserted)
    }
}
