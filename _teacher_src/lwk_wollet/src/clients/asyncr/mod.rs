//! Asyncronous clients to fetch data from the Blockchain. Suitable to be used in WASM environments like in the browser.

mod esplora;

pub use crate::clients::EsploraClientBuilder;
pub use esplora::EsploraClient;
pub use esplora::LastUsedIndexResponse;
pub use esplora::{async_now, async_sleep};
