//! Leaf error type for every adapter, and its mapping onto the core's
//! error taxonomy.

use addr_indexer_core::error::CoreError;
use thiserror::Error;

/// Errors an adapter can raise before the core ever sees them.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The document store rejected a read or write.
    #[error("history store error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// The key/value cache rejected a read or write.
    #[error("cache error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A cached snapshot blob could not be decoded.
    #[error("cache decode error: {0}")]
    CborDecode(#[from] ciborium::de::Error<std::io::Error>),

    /// A snapshot could not be encoded for caching.
    #[error("cache encode error: {0}")]
    CborEncode(#[from] ciborium::ser::Error<std::io::Error>),

    /// The upstream JSON-RPC transport failed.
    #[error("upstream rpc error: {0}")]
    JsonRpc(#[from] jsonrpc::Error),

    /// The upstream node returned a response this adapter could not
    /// interpret.
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),

    /// The state-gate key held a value other than the two recognized
    /// tags.
    #[error("unrecognized state gate value: {0}")]
    UnrecognizedGateValue(String),

    /// The state-gate key was absent. The gate must be populated before
    /// a request is processed; an absent key is a protocol error, not
    /// an implicit "existing".
    #[error("state gate key was not populated")]
    MissingGateValue,
}

impl From<AdapterError> for CoreError {
    fn from(e: AdapterError) -> Self {
        match e {
            AdapterError::MalformedResponse(msg) => CoreError::Protocol(msg),
            AdapterError::UnrecognizedGateValue(msg) => CoreError::Protocol(msg),
            AdapterError::MissingGateValue => {
                CoreError::Protocol("state gate key was not populated".to_string())
            }
            other => CoreError::Dependency(Box::new(other)),
        }
    }
}
