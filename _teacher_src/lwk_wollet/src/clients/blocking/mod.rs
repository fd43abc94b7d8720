#[cfg(feature = "esplora")]
mod esplora;

#[cfg(feature = "esplora")]
pub use esplora::EsploraClient;

#[cfg(feature = "electrum")]
pub(crate) mod electrum_client;
