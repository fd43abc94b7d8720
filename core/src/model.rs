//! The data shapes that flow through the indexer: unspent outputs, the
//! durable shard format, the folded (store-side) snapshot, and the
//! real-time live view returned to callers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single unspent transaction output belonging to the tracked address.
///
/// Amounts are carried in the smallest ledger unit (non-negative).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unspent {
    /// Identifier of the transaction that created this output.
    pub txid: String,
    /// Index of this output within its transaction.
    pub vout: u32,
    /// The output's locking script, hex-encoded.
    pub script_pubkey: String,
    /// Value of the output in the smallest ledger unit.
    pub amount: i64,
    /// Unix time of the block that confirmed the creating transaction.
    pub block_time: i64,
}

impl Unspent {
    /// The outpoint key identifying this output.
    pub fn key(&self) -> String {
        crate::keys::outpoint_key(&self.txid, self.vout)
    }
}

/// One append-only unit of durable history for an address.
///
/// A shard records the net effect of a single indexer run that produced
/// at least one newly-confirmed transaction. Shards are never updated in
/// place; history accumulates by appending more of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shard {
    /// Address this shard belongs to.
    pub address: String,
    /// Store-assigned ordering timestamp, used only to fold shards
    /// deterministically; opaque otherwise.
    pub timestamp: i64,
    /// Net delta in value contributed by this shard.
    pub subtotal: i64,
    /// Outputs created by this shard, keyed by outpoint.
    pub unspent_amounts: HashMap<String, i64>,
    /// Same outputs as `unspent_amounts`, in upstream delivery order.
    pub unspents: Vec<Unspent>,
    /// Spent flags for outputs created in this shard (self-closure).
    pub spents: HashMap<String, bool>,
    /// Outpoints this shard spends that were created in an older shard.
    pub shadow_spents: Vec<String>,
    /// Transaction identifiers included in this shard, in feed order.
    pub transactions: Vec<String>,
    /// Count of persistent transactions covered by this shard and all
    /// prior shards combined; the next pagination cursor.
    pub skipped: u64,
}

impl Shard {
    /// An empty shard for `address`, usable as the fold's starting value.
    pub fn empty(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            timestamp: 0,
            subtotal: 0,
            unspent_amounts: HashMap::new(),
            unspents: Vec::new(),
            spents: HashMap::new(),
            shadow_spents: Vec::new(),
            transactions: Vec::new(),
            skipped: 0,
        }
    }
}

/// The result of folding every durable shard of an address together,
/// with shadow spents reapplied against the combined spent map.
///
/// Distinguished from a bare [`Shard`] because producing one requires
/// the stronger fold (see [`crate::shard::load_folded`]) rather than the
/// plain [`crate::shard::combine`] algebra, which does not reapply
/// shadow spents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldedSnapshot(pub Shard);

impl FoldedSnapshot {
    /// An empty folded snapshot, as if no shard had ever been written.
    pub fn empty(address: impl Into<String>) -> Self {
        Self(Shard::empty(address))
    }
}

/// The real-time view returned to callers: a folded snapshot extended
/// with pending (not-yet-durable) effects. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveView {
    /// Address this view describes.
    pub address: String,
    /// Signed balance including pending effects.
    pub subtotal_all: i64,
    /// Signed balance restricted to durable (persisted) effects.
    pub subtotal_db: i64,
    /// All transaction identifiers touching the address, feed order.
    pub transactions: Vec<String>,
    /// All outputs observed for the address, insertion order.
    pub unspents: Vec<Unspent>,
    /// Spent flag for every outpoint named in `unspents`, durable or not.
    pub spent: HashMap<String, bool>,
}

impl LiveView {
    /// Outputs whose spent flag is false, preserving insertion order.
    pub fn unspent_outputs(&self) -> Vec<&Unspent> {
        self.unspents
            .iter()
            .filter(|u| !self.spent.get(&u.key()).copied().unwrap_or(false))
            .collect()
    }
}
