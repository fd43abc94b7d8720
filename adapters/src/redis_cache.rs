//! Snapshot cache and state-gate adapters backed by a Redis-compatible
//! key/value store.

use std::sync::Mutex;

use redis::Commands;

use addr_indexer_core::error::CoreError;
use addr_indexer_core::model::Shard;
use addr_indexer_core::ports::{GateValue, SnapshotCache, StateGate};

use crate::error::AdapterError;

fn encode(shard: &Shard) -> Result<Vec<u8>, AdapterError> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(shard, &mut buf)?;
    Ok(buf)
}

fn decode(bytes: &[u8]) -> Result<Shard, AdapterError> {
    Ok(ciborium::de::from_reader(bytes)?)
}

/// Snapshot cache storing each shard as a self-describing CBOR blob.
pub struct RedisSnapshotCache {
    conn: Mutex<redis::Connection>,
}

impl RedisSnapshotCache {
    /// Connect to a Redis-compatible server at `url`.
    pub fn connect(url: &str) -> Result<Self, AdapterError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl SnapshotCache for RedisSnapshotCache {
    fn get(&self, key: &str) -> Result<Option<Shard>, CoreError> {
        let mut conn = self.conn.lock().unwrap();
        let bytes: Option<Vec<u8>> = conn.get(key).map_err(AdapterError::from)?;
        match bytes {
            None => Ok(None),
            Some(b) => Ok(Some(decode(&b).map_err(AdapterError::from)?)),
        }
    }

    fn put(&self, key: &str, shard: &Shard, ttl_secs: u64) -> Result<(), CoreError> {
        let bytes = encode(shard).map_err(CoreError::from)?;
        let mut conn = self.conn.lock().unwrap();
        let _: () = conn
            .set_ex(key, bytes, ttl_secs)
            .map_err(AdapterError::from)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CoreError> {
        let mut conn = self.conn.lock().unwrap();
        let _: () = conn.del(key).map_err(AdapterError::from)?;
        Ok(())
    }
}

/// Single-writer gate marking whether a request is for a previously
/// seen address ("existing") or a genuinely new one ("new").
pub struct RedisStateGate {
    conn: Mutex<redis::Connection>,
}

impl RedisStateGate {
    /// Connect to a Redis-compatible server at `url`.
    pub fn connect(url: &str) -> Result<Self, AdapterError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl StateGate for RedisStateGate {
    fn get(&self, key: &str) -> Result<GateValue, CoreError> {
        let mut conn = self.conn.lock().unwrap();
        let value: Option<String> = conn.get(key).map_err(AdapterError::from)?;
        match value.as_deref() {
            Some("new") => Ok(GateValue::New),
            Some("existing") => Ok(GateValue::Existing),
            None => Err(AdapterError::MissingGateValue.into()),
            Some(other) => {
                Err(AdapterError::UnrecognizedGateValue(other.to_string()).into())
            }
        }
    }

    fn mark_existing(&self, key: &str) -> Result<(), CoreError> {
        let mut conn = self.conn.lock().unwrap();
        let _: () = conn.set(key, "existing").map_err(AdapterError::from)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CoreError> {
        let mut conn = self.conn.lock().unwrap();
        let _: () = conn.del(key).map_err(AdapterError::from)?;
        Ok(())
    }
}
