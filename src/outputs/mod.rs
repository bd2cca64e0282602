//! Output sinks for collected posts.
//!
//! # Submodules
//!
//! - [`flat_file`]: CSV file with `postText`, `postDate`, `comments`
//! - [`document_store`]: MongoDB collection, one document per post
//!
//! Both sinks receive the full result of a run, once, at the end. They are
//! independent: a failure in one is logged and the other is still attempted.
//! Nothing is written when a run collected no posts.

pub mod document_store;
pub mod flat_file;

use crate::config::{DocumentStoreTarget, SinkConfig};
use crate::error::SinkWriteError;
use crate::models::NormalizedPost;
use document_store::MongoStore;
use std::path::Path;
use tracing::{error, info, instrument, warn};

/// Destinations for a run's posts.
pub trait SinkAdapter {
    /// Write all posts to a flat file at `path`. Returns the number of rows.
    async fn write_flat_file(
        &self,
        posts: &[NormalizedPost],
        path: &Path,
    ) -> Result<usize, SinkWriteError>;

    /// Insert all posts into the document store. Returns the number of documents.
    async fn write_document_store(
        &self,
        posts: &[NormalizedPost],
        target: &DocumentStoreTarget,
    ) -> Result<usize, SinkWriteError>;
}

/// CSV on disk plus MongoDB.
#[derive(Debug, Clone)]
pub struct Sinks {
    mongo_uri: String,
}

impl Sinks {
    pub fn new(mongo_uri: impl Into<String>) -> Self {
        Self {
            mongo_uri: mongo_uri.into(),
        }
    }
}

impl SinkAdapter for Sinks {
    async fn write_flat_file(
        &self,
        posts: &[NormalizedPost],
        path: &Path,
    ) -> Result<usize, SinkWriteError> {
        flat_file::write_csv(posts, path).await
    }

    async fn write_document_store(
        &self,
        posts: &[NormalizedPost],
        target: &DocumentStoreTarget,
    ) -> Result<usize, SinkWriteError> {
        let store = MongoStore::connect(&self.mongo_uri).await?;
        store.insert_posts(posts, target).await
    }
}

/// What happened when a run's posts were handed to the sinks.
#[derive(Debug)]
pub enum Delivery {
    /// The run collected nothing; no sink was called.
    NoData,
    Delivered {
        flat_file: Result<usize, SinkWriteError>,
        document_store: Result<usize, SinkWriteError>,
    },
}

impl Delivery {
    /// Names of the sinks that did not save the run; empty when every
    /// output was written or no sink was called.
    pub fn failed_sinks(&self) -> Vec<&'static str> {
        match self {
            Delivery::NoData => Vec::new(),
            Delivery::Delivered {
                flat_file,
                document_store,
            } => [("flat_file", flat_file.is_err()), ("document_store", document_store.is_err())]
                .into_iter()
                .filter_map(|(name, failed)| failed.then_some(name))
                .collect(),
        }
    }
}

/// Hand the final posts of a run to both sinks.
///
/// The flat file is written first, then the document store. Each result is
/// logged on its own and neither failure stops the other sink.
///
/// # Arguments
///
/// * `sinks` - Where the posts go.
/// * `posts` - The accumulated posts of the run, in discovery order.
/// * `config` - Output path and document-store target.
///
/// # Returns
///
/// [`Delivery::NoData`] without calling any sink when `posts` is empty,
/// otherwise both sink results.
#[instrument(level = "info", skip_all, fields(posts = posts.len()))]
pub async fn deliver<S: SinkAdapter>(
    sinks: &S,
    posts: &[NormalizedPost],
    config: &SinkConfig,
) -> Delivery {
    if posts.is_empty() {
        warn!("No posts collected; nothing to save");
        return Delivery::NoData;
    }

    let flat_file = sinks.write_flat_file(posts, &config.output_path).await;
    match &flat_file {
        Ok(rows) => info!(rows, path = %config.output_path.display(), "Flat file written"),
        Err(e) => error!(path = %config.output_path.display(), error = %e, "Error creating CSV file"),
    }

    let document_store = sinks
        .write_document_store(posts, &config.document_store)
        .await;
    match &document_store {
        Ok(inserted) => info!(
            inserted,
            database = %config.document_store.database,
            collection = %config.document_store.collection,
            "Document store updated"
        ),
        Err(e) => error!(error = %e, "Error saving to MongoDB"),
    }

    Delivery::Delivered {
        flat_file,
        document_store,
    }
}
