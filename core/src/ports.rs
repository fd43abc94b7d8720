//! The interfaces the engine consumes. Concrete implementations (a
//! document store, a key/value cache, a JSON-RPC client) live in the
//! adapters crate; the engine only ever depends on these traits.

use crate::error::CoreError;
use crate::model::Shard;

/// Durable, append-only history of shards for an address.
pub trait HistoryStore: Send + Sync {
    /// Append a new shard. Implementations must never update a
    /// previously-written shard in place.
    fn put(&self, shard: &Shard) -> Result<(), CoreError>;

    /// Every shard for `address`, ordered ascending by the store's
    /// insertion timestamp. An empty result means no history exists.
    fn load_shards(&self, address: &str) -> Result<Vec<Shard>, CoreError>;
}

/// Short-lived cache of the most recently computed durable snapshot.
pub trait SnapshotCache: Send + Sync {
    /// `None` on cache miss.
    fn get(&self, key: &str) -> Result<Option<Shard>, CoreError>;

    /// Overwrite the cached value with the given time-to-live, in seconds.
    fn put(&self, key: &str, shard: &Shard, ttl_secs: u64) -> Result<(), CoreError>;

    /// Best-effort removal; implementations should not fail the caller
    /// when the key is already absent.
    fn delete(&self, key: &str) -> Result<(), CoreError>;
}

/// A single raw transaction as reported by the upstream feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTx {
    /// Transaction identifier.
    pub txid: String,
    /// Unix time of the confirming block; meaningless when unconfirmed.
    pub block_time: i64,
    /// Number of confirmations as of the query.
    pub confirmations: u32,
    /// Inputs, in transaction order.
    pub vin: Vec<RawInput>,
    /// Outputs, in transaction order.
    pub vout: Vec<RawOutput>,
}

/// One input of a [`RawTx`]: the outpoint it spends and the addresses
/// that owned that outpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInput {
    /// Identifier of the transaction that created the spent output.
    pub prev_txid: String,
    /// Index of the spent output within its creating transaction.
    pub prev_vout: u32,
    /// Addresses that owned the spent output.
    pub prev_addresses: Vec<String>,
}

/// One output of a [`RawTx`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutput {
    /// Value in the smallest ledger unit.
    pub value: i64,
    /// Locking script, hex-encoded.
    pub script_pubkey: String,
    /// Addresses that receive this output.
    pub addresses: Vec<String>,
}

/// A finite page of transactions touching an address, in upstream
/// delivery order. A page shorter than requested signals drain.
pub trait RawTxSource: Send + Sync {
    /// Fetch up to `count` transactions for `address`, skipping the
    /// first `skip` by persistent-transaction count.
    fn search_raw_transactions(
        &self,
        address: &str,
        skip: u64,
        count: u64,
    ) -> Result<Vec<RawTx>, CoreError>;
}

/// The two recognized values of the external state gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateValue {
    /// The address has no prior durable or cached snapshot.
    New,
    /// The address may have a prior durable or cached snapshot.
    Existing,
}

/// Single-writer marker, external to the engine, that classifies a
/// request and is deleted unconditionally on exit.
///
/// Population is an external-scheduler concern (see [`crate::engine`]);
/// the engine itself only ever calls [`StateGate::get`] and
/// [`StateGate::delete`].
pub trait StateGate: Send + Sync {
    /// Read the gate value for `key`. Any value other than the two
    /// recognized tags, including an absent key, is a protocol error.
    fn get(&self, key: &str) -> Result<GateValue, CoreError>;

    /// Mark `key` as `existing`, the value a caller writes immediately
    /// before a request it already expects the gate to resolve through
    /// the existing-address path.
    fn mark_existing(&self, key: &str) -> Result<(), CoreError>;

    /// Remove the gate entry. Called unconditionally on every exit path.
    fn delete(&self, key: &str) -> Result<(), CoreError>;
}
