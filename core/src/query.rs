//! Thin projections over a reconstructed [`LiveView`].

use serde::{Deserialize, Serialize};

use crate::model::{LiveView, Unspent};

/// The four projections a caller may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Current confirmed-plus-pending balance.
    Balance,
    /// All transaction identifiers touching the address.
    Transactions,
    /// Current unspent outputs.
    Unspents,
    /// Balance, transactions and unspents together.
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

/// Balance expressed as a display-unit decimal (divide the signed
/// smallest-unit subtotal by 10^8).
pub fn balance(view: &LiveView) -> f64 {
    view.subtotal_all as f64 / 100_000_000.0
}

/// All transaction identifiers touching the address, feed order.
pub fn transactions(view: &LiveView) -> &[String] {
    &view.transactions
}

/// Current unspent outputs, preserving insertion order.
pub fn unspents(view: &LiveView) -> Vec<&Unspent> {
    view.unspent_outputs()
}

/// The combined bundle returned for [`Task::All`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
    /// See [`balance`].
    pub balance: f64,
    /// See [`transactions`].
    pub transactions: Vec<String>,
    /// See [`unspents`].
    pub unspents: Vec<Unspent>,
}

/// Build the combined bundle for [`Task::All`].
pub fn all(view: &LiveView) -> Bundle {
    Bundle {
        balance: balance(view),
        transactions: view.transactions.clone(),
        unspents: unspents(view).into_iter().cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn view() -> LiveView {
        let u1 = Unspent {
            txid: "a".into(),
            vout: 0,
            script_pubkey: "76a9".into(),
            amount: 100_000_000,
            block_time: 1,
        };
        let u2 = Unspent {
            txid: "b".into(),
            vout: 1,
            script_pubkey: "76a9".into(),
            amount: 6_292_938,
            block_time: 2,
        };
        let mut spent = HashMap::new();
        spent.insert(u1.key(), true);
        LiveView {
            address: "addr".into(),
            subtotal_all: 6_292_938,
            subtotal_db: 6_292_938,
            transactions: vec!["a".into(), "b".into()],
            unspents: vec![u1, u2],
            spent,
        }
    }

    #[test]
    fn balance_converts_to_display_units() {
        let v = view();
        assert!((balance(&v) - 0.06292938).abs() < 1e-12);
    }

    #[test]
    fn unspents_excludes_spent_outputs() {
        let v = view();
        let u = unspents(&v);
        assert_eq!(u.len(), 1);
        assert_eq!(u[0].txid, "b");
    }
}
