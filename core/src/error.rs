//! The error taxonomy the engine surfaces, ordered from most local to
//! most severe. See the module-level documentation in [`crate::engine`]
//! for how each variant affects persistence and caching side effects.

use thiserror::Error;

/// A specific reason a [`CoreError::CorruptedHistory`] was raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Corruption {
    /// The same outpoint was spent persistently more than once.
    #[error("outpoint {0} spent more than once")]
    DoubleSpend(String),
    /// An input referenced an outpoint not present in any known partition.
    #[error("outpoint {0} referenced by an input but never observed as created")]
    UnknownOutpoint(String),
    /// Two shards for the same address created an overlapping outpoint key.
    #[error("outpoint {0} created by more than one shard")]
    ShardKeyCollision(String),
    /// A shard's shadow-spent list named a key absent from the combined map.
    #[error("shadow-spent outpoint {0} not found in folded snapshot")]
    DanglingShadowSpent(String),
    /// A persistent transaction spent an outpoint that was only ever
    /// created by a still-pending transaction. A persistent spend must
    /// resolve against the preDB or DB partitions.
    #[error("outpoint {0} spent persistently but only created by a pending transaction")]
    PersistentSpendOfPendingOutput(String),
}

/// Errors the indexer core can return from a single request.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An adapter (history store, cache, or raw-tx source) reported an
    /// I/O failure or timeout. The request's outcome; not retried here.
    #[error("dependency failure: {0}")]
    Dependency(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The state gate carried a value other than the two recognized tags,
    /// or an upstream response could not be interpreted.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The history is internally inconsistent with the observed feed.
    /// No new shard is written and the cache is left untouched.
    #[error("corrupted history: {0}")]
    CorruptedHistory(#[from] Corruption),

    /// The request's deadline elapsed before completion.
    #[error("request timed out")]
    Timeout,
}

impl CoreError {
    /// True for [`CoreError::CorruptedHistory`], the only category that
    /// warrants flagging for human investigation.
    pub fn is_corrupted_history(&self) -> bool {
        matches!(self, CoreError::CorruptedHistory(_))
    }
}
