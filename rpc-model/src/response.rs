//! Data model of the response published back over the message bus.

#[cfg(doc)]
use crate::request;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An unspent output, in the field casing external consumers expect
/// (preserved from this worker's predecessor for compatibility).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Unspent {
    /// Identifier of the transaction that created this output.
    #[serde(rename = "Transaction")]
    pub transaction: String,
    /// Index of this output within its transaction.
    #[serde(rename = "VOutIdx")]
    pub vout_idx: u32,
    /// The output's locking script, hex-encoded.
    #[serde(rename = "ScriptPubKey")]
    pub script_pubkey: String,
    /// Value of the output in the smallest ledger unit.
    #[serde(rename = "Amount")]
    pub amount: i64,
    /// Unix time of the block that confirmed the creating transaction.
    #[serde(rename = "BlockTime")]
    pub block_time: i64,
}

/// The combined bundle returned for [`request::Task::All`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AllData {
    /// See [`Data::Balance`].
    pub balance: f64,
    /// See [`Data::Transactions`].
    pub transactions: Vec<String>,
    /// See [`Data::Unspents`].
    pub unspents: Vec<Unspent>,
}

/// The `data` payload of a [`Response`], shaped by the originating
/// request's task.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Data {
    /// Display-unit balance, for [`request::Task::Balance`].
    Balance(f64),
    /// Transaction identifiers, for [`request::Task::Transactions`].
    Transactions(Vec<String>),
    /// Unspent outputs, for [`request::Task::Unspents`].
    Unspents(Vec<Unspent>),
    /// Combined bundle, for [`request::Task::All`].
    All(AllData),
}

/// Response published to the fanout exchange for a completed request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Response {
    /// Echoes the originating request's task tag.
    pub command: String,
    /// Echoes the originating request's account, so consumers can
    /// filter the fanout exchange client-side.
    pub account: String,
    /// The computed projection.
    pub data: Data,
}
