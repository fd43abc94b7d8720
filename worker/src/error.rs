//! Process-level error type, unifying every crate this binary depends on.

use addr_indexer_adapters::AdapterError;
use addr_indexer_bus::Error as BusError;
use addr_indexer_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration value was present but could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// An adapter (history store, cache, or raw-tx source) failed.
    #[error("adapter error: {0}")]
    Adapter(#[from] AdapterError),

    /// The indexer core reported a failure reconstructing state.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// The message bus reported a transport-level failure.
    #[error("bus error: {0}")]
    Bus(#[from] BusError),

    /// A request or response envelope failed to (de)serialize.
    #[error("envelope error: {0}")]
    Envelope(#[from] serde_json::Error),

    /// The upstream AMQP broker connection could not be established.
    #[error("amqp connection error: {0}")]
    Amqp(#[from] lapin::Error),
}
