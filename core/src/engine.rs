//! The address-state reconstruction engine: the state machine described
//! as Gating → Loading → Ingesting → Promoting → Done.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Corruption, CoreError};
use crate::keys;
use crate::model::{FoldedSnapshot, LiveView, Shard, Unspent};
use crate::ports::{GateValue, HistoryStore, RawTxSource, SnapshotCache, StateGate};
use crate::shard;

/// A transaction with more confirmations than this is durable.
pub const CONFIRMATION_THRESHOLD: u32 = 6;
/// Page size requested from the raw-transaction source per round trip.
pub const MAX_PAGE: u64 = 2000;
/// Time-to-live applied to every cache write.
pub const CACHE_TTL_SECS: u64 = 3600;

/// Removes a state-gate entry unconditionally when dropped, regardless
/// of which exit path (success, `?`, panic unwind) the request took.
struct GateGuard {
    gate: Arc<dyn StateGate>,
    key: String,
}

impl Drop for GateGuard {
    fn drop(&mut self) {
        if let Err(e) = self.gate.delete(&self.key) {
            log::warn!("failed to delete state gate {}: {e}", self.key);
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Partition {
    PreDb,
    Db,
    NonDb,
}

/// The indexer core, parameterized over its three external collaborators
/// and the state gate. Holds no per-address state itself; all
/// coordination lives in the external gate.
pub struct Engine {
    history: Arc<dyn HistoryStore>,
    cache: Arc<dyn SnapshotCache>,
    raw_tx: Arc<dyn RawTxSource>,
    gate: Arc<dyn StateGate>,
}

impl Engine {
    /// Build an engine over the given adapters.
    pub fn new(
        history: Arc<dyn HistoryStore>,
        cache: Arc<dyn SnapshotCache>,
        raw_tx: Arc<dyn RawTxSource>,
        gate: Arc<dyn StateGate>,
    ) -> Self {
        Self {
            history,
            cache,
            raw_tx,
            gate,
        }
    }

    /// Reconstruct the live view of `address` for request tag `op`
    /// (one of the four projection tags used to key the state gate and
    /// cache entries).
    pub fn reconstruct(&self, address: &str, op: &str) -> Result<LiveView, CoreError> {
        let skey = keys::state_key(address, op);
        let ckey = keys::cache_key(address, op);
        let _guard = GateGuard {
            gate: self.gate.clone(),
            key: skey.clone(),
        };

        let gate_value = self.gate.get(&skey)?;

        let (prior, cache_missed) = match gate_value {
            GateValue::New => (FoldedSnapshot::empty(address), false),
            GateValue::Existing => match self.cache.get(&ckey)? {
                Some(shard) => (FoldedSnapshot(shard), false),
                None => {
                    let shards = self.history.load_shards(address)?;
                    let folded = if shards.is_empty() {
                        FoldedSnapshot::empty(address)
                    } else {
                        shard::fold_all(address, shards)?
                    };
                    (folded, true)
                }
            },
        };

        let pre_db_amounts = prior.0.unspent_amounts.clone();
        let mut live_spent: HashMap<String, bool> = prior.0.spents.clone();

        let mut db_unspent_amounts: HashMap<String, i64> = HashMap::new();
        // Tracks the shard's own self-closure bookkeeping: true only once an
        // outpoint created by a persistent transaction in this shard has
        // also been spent by a persistent transaction in this shard.
        // Deliberately distinct from `live_spent`, which also records
        // spends by non-persistent transactions and must never leak into
        // durable shard invariants (shard invariant 3, §3).
        let mut db_spents: HashMap<String, bool> = HashMap::new();
        let mut non_db_amounts: HashMap<String, i64> = HashMap::new();
        let mut db_shadow_spents: Vec<String> = Vec::new();
        let mut db_transactions: Vec<String> = Vec::new();
        let mut all_transactions: Vec<String> = Vec::new();
        let mut new_unspents: Vec<Unspent> = Vec::new();

        let mut subtotal_all = prior.0.subtotal;
        let mut shard_subtotal_delta: i64 = 0;

        let mut skip = prior.0.skipped;
        loop {
            let page = self.raw_tx.search_raw_transactions(address, skip, MAX_PAGE)?;
            let page_len = page.len() as u64;
            let drained = page_len < MAX_PAGE;

            for tx in page {
                if tx.confirmations == 0 {
                    continue;
                }
                let persistent = tx.confirmations > CONFIRMATION_THRESHOLD;

                all_transactions.push(tx.txid.clone());
                if persistent {
                    db_transactions.push(tx.txid.clone());
                }

                for (idx, out) in tx.vout.iter().enumerate() {
                    if !out.addresses.iter().any(|a| a == address) {
                        continue;
                    }
                    let key = keys::outpoint_key(&tx.txid, idx as u32);
                    let unspent = Unspent {
                        txid: tx.txid.clone(),
                        vout: idx as u32,
                        script_pubkey: out.script_pubkey.clone(),
                        amount: out.value,
                        block_time: tx.block_time,
                    };
                    if persistent {
                        db_unspent_amounts.insert(key.clone(), out.value);
                        db_spents.insert(key, false);
                        shard_subtotal_delta += out.value;
                    } else {
                        non_db_amounts.insert(key, out.value);
                    }
                    subtotal_all += out.value;
                    new_unspents.push(unspent);
                }

                for vin in &tx.vin {
                    if !vin.prev_addresses.iter().any(|a| a == address) {
                        continue;
                    }
                    let key = keys::outpoint_key(&vin.prev_txid, vin.prev_vout);

                    let partition = if pre_db_amounts.contains_key(&key) {
                        Partition::PreDb
                    } else if db_unspent_amounts.contains_key(&key) {
                        Partition::Db
                    } else if non_db_amounts.contains_key(&key) {
                        Partition::NonDb
                    } else {
                        return Err(CoreError::CorruptedHistory(Corruption::UnknownOutpoint(
                            key,
                        )));
                    };

                    if live_spent.get(&key).copied().unwrap_or(false) {
                        return Err(CoreError::CorruptedHistory(Corruption::DoubleSpend(key)));
                    }
                    live_spent.insert(key.clone(), true);

                    let amount = match partition {
                        Partition::PreDb => pre_db_amounts[&key],
                        Partition::Db => db_unspent_amounts[&key],
                        Partition::NonDb => non_db_amounts[&key],
                    };
                    subtotal_all -= amount;

                    if persistent {
                        match partition {
                            Partition::PreDb => db_shadow_spents.push(key),
                            Partition::Db => {
                                db_spents.insert(key, true);
                            }
                            // A persistent transaction must resolve against the
                            // preDB or DB partitions; an output only ever created
                            // by a still-pending transaction has no durable
                            // accounting to close out.
                            Partition::NonDb => {
                                return Err(CoreError::CorruptedHistory(
                                    Corruption::PersistentSpendOfPendingOutput(key),
                                ));
                            }
                        }
                        shard_subtotal_delta -= amount;
                    }
                }
            }

            skip += page_len;
            if drained {
                break;
            }
        }

        let db_unspents: Vec<Unspent> = new_unspents
            .iter()
            .filter(|u| db_unspent_amounts.contains_key(&u.key()))
            .cloned()
            .collect();

        let new_skipped = prior.0.skipped + db_transactions.len() as u64;

        if !db_transactions.is_empty() {
            let shard = Shard {
                address: address.to_string(),
                timestamp: now_millis(),
                subtotal: shard_subtotal_delta,
                unspent_amounts: db_unspent_amounts,
                unspents: db_unspents,
                spents: db_spents,
                shadow_spents: db_shadow_spents,
                transactions: db_transactions,
                skipped: new_skipped,
            };

            self.history.put(&shard)?;

            let combined = shard::combine(prior.0.clone(), shard)?;
            if let Err(e) = self.cache.put(&ckey, &combined, CACHE_TTL_SECS) {
                log::warn!("cache write failed for {ckey}, evicting stale entry: {e}");
                let _ = self.cache.delete(&ckey);
            }
        } else if cache_missed {
            if let Err(e) = self.cache.put(&ckey, &prior.0, CACHE_TTL_SECS) {
                log::warn!("cache refresh failed for {ckey}, evicting stale entry: {e}");
                let _ = self.cache.delete(&ckey);
            }
        }

        let mut transactions = prior.0.transactions.clone();
        transactions.extend(all_transactions);

        let mut unspents = prior.0.unspents.clone();
        unspents.extend(new_unspents);

        Ok(LiveView {
            address: address.to_string(),
            subtotal_all,
            subtotal_db: prior.0.subtotal + shard_subtotal_delta,
            transactions,
            unspents,
            spent: live_spent,
        })
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
