//! Data model of the request delivered over the message bus.

#[cfg(doc)]
use crate::response;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The projection a caller wants computed for an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Current confirmed-plus-pending balance, see [`response::BalanceData`].
    Balance,
    /// All transaction identifiers touching the address, see [`response::TransactionsData`].
    Transactions,
    /// Current unspent outputs, see [`response::UnspentsData`].
    Unspents,
    /// Balance, transactions and unspents together, see [`response::AllData`].
    All,
}

impl Task {
    /// The tag used to key the state gate and cache entries for this task.
    pub fn tag(self) -> &'static str {
        match self {
            Task::Balance => "balance",
            Task::Transactions => "transactions",
            Task::Unspents => "unspents",
            Task::All => "all",
        }
    }
}

/// Request to reconstruct state for a single address.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Request {
    /// The address to reconstruct state for.
    pub account: String,
    /// Which projection to compute and return.
    pub task: Task,
}
