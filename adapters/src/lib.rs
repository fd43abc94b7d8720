#![deny(missing_docs)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]

//! Concrete adapters implementing the ports the indexer core consumes:
//! a document-store history, a Redis-compatible snapshot cache and
//! state gate, and a JSON-RPC raw-transaction source.

pub mod error;
pub mod mongo_store;
pub mod redis_cache;
pub mod rpc_source;

pub use error::AdapterError;
pub use mongo_store::MongoHistoryStore;
pub use redis_cache::{RedisSnapshotCache, RedisStateGate};
pub use rpc_source::JsonRpcRawTxSource;
