//! History-store adapter backed by a document database.
//!
//! The async mongodb driver is wrapped behind a dedicated [`Runtime`]
//! so the rest of the worker can stay synchronous, mirroring the
//! blocking-facade-over-async pattern this codebase already uses for
//! its other network clients.

use futures_util::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::{ClientOptions, FindOptions};
use mongodb::{Client, Collection};
use tokio::runtime::Runtime;

use addr_indexer_core::error::CoreError;
use addr_indexer_core::model::Shard;
use addr_indexer_core::ports::HistoryStore;

use crate::error::AdapterError;

const COLLECTION_NAME: &str = "users";

/// Durable shard history stored as one document per shard in a single
/// collection, indexed by address and ordered for folding by the
/// shard's own `timestamp` field.
pub struct MongoHistoryStore {
    rt: Runtime,
    collection: Collection<Shard>,
}

impl MongoHistoryStore {
    /// Connect to `uri` and bind to `database`'s `users` collection.
    pub fn connect(uri: &str, database: &str) -> Result<Self, AdapterError> {
        let rt = Runtime::new().expect("failed to start mongo runtime");
        let collection = rt.block_on(async {
            let options = ClientOptions::parse(uri).await?;
            let client = Client::with_options(options)?;
            Ok::<_, mongodb::error::Error>(
                client.database(database).collection::<Shard>(COLLECTION_NAME),
            )
        })?;
        Ok(Self { rt, collection })
    }
}

impl HistoryStore for MongoHistoryStore {
    fn put(&self, shard: &Shard) -> Result<(), CoreError> {
        self.rt
            .block_on(self.collection.insert_one(shard, None))
            .map_err(AdapterError::from)?;
        Ok(())
    }

    fn load_shards(&self, address: &str) -> Result<Vec<Shard>, CoreError> {
        let filter = doc! { "address": address };
        let find_options = FindOptions::builder().sort(doc! { "timestamp": 1 }).build();
        let shards = self.rt.block_on(async {
            let mut cursor = self.collection.find(filter, find_options).await?;
            let mut out = Vec::new();
            while let Some(shard) = cursor.try_next().await? {
                out.push(shard);
            }
            Ok::<_, mongodb::error::Error>(out)
        });
        shards.map_err(|e| AdapterError::from(e).into())
    }
}
