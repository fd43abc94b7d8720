//! The merge law over shards: [`combine`] for promotion-time folding of
//! a prior snapshot with a freshly-written shard, and [`fold_all`] for
//! the full ordered left-fold performed when loading history from the
//! store. The two are deliberately asymmetric: only `fold_all` reapplies
//! shadow spents.

use crate::error::{Corruption, CoreError};
use crate::model::{FoldedSnapshot, Shard};

/// Combine two shards where `b` is newer than `a`, without reapplying
/// `b`'s shadow spents against `a`'s spent map.
///
/// Used at promotion time (see [`crate::engine`]) to fold a prior
/// snapshot with the shard just written, so the cache can be refreshed
/// without a full round trip through the history store. The next call
/// to [`fold_all`] will reapply the shadow spents that this function
/// intentionally leaves untouched.
pub fn combine(a: Shard, b: Shard) -> Result<Shard, CoreError> {
    if a.transactions.is_empty() && a.unspents.is_empty() && a.timestamp == 0 {
        return Ok(b);
    }
    if b.transactions.is_empty() && b.unspents.is_empty() && b.timestamp == 0 {
        return Ok(a);
    }

    let mut unspent_amounts = a.unspent_amounts;
    for (k, v) in b.unspent_amounts {
        if unspent_amounts.insert(k.clone(), v).is_some() {
            return Err(CoreError::CorruptedHistory(Corruption::ShardKeyCollision(
                k,
            )));
        }
    }

    let mut spents = a.spents;
    for (k, v) in b.spents {
        if spents.insert(k.clone(), v).is_some() {
            return Err(CoreError::CorruptedHistory(Corruption::ShardKeyCollision(
                k,
            )));
        }
    }

    let mut unspents = a.unspents;
    unspents.extend(b.unspents);

    let mut shadow_spents = a.shadow_spents;
    shadow_spents.extend(b.shadow_spents);

    let mut transactions = a.transactions;
    transactions.extend(b.transactions);

    Ok(Shard {
        address: a.address,
        timestamp: b.timestamp,
        subtotal: a.subtotal + b.subtotal,
        unspent_amounts,
        unspents,
        spents,
        shadow_spents,
        transactions,
        skipped: b.skipped,
    })
}

/// Fold every durable shard for an address, ordered ascending by the
/// store's insertion timestamp, into one [`FoldedSnapshot`].
///
/// Unlike [`combine`], this reapplies every shard's shadow spents
/// against the combined spent map, which is the step that makes a
/// cross-shard spend visible as such.
pub fn fold_all(address: &str, shards: Vec<Shard>) -> Result<FoldedSnapshot, CoreError> {
    let mut acc = Shard::empty(address);
    let mut shadow_queue: Vec<String> = Vec::new();

    for shard in shards {
        acc = combine(acc, shard)?;
    }

    // shadow_spents accumulated across every shard in delivery order;
    // each must resolve against the fully-combined spent map.
    shadow_queue.extend(acc.shadow_spents.iter().cloned());
    for key in shadow_queue {
        match acc.spents.get(&key).copied() {
            None => {
                return Err(CoreError::CorruptedHistory(Corruption::DanglingShadowSpent(
                    key,
                )))
            }
            Some(true) => {
                return Err(CoreError::CorruptedHistory(Corruption::DoubleSpend(key)))
            }
            Some(false) => {
                acc.spents.insert(key, true);
            }
        }
    }

    Ok(FoldedSnapshot(acc))
}
