//! End-to-end tests exercising the engine against in-memory fakes of
//! the three adapter ports, covering the documented properties and
//! scenarios for the reconstruction algorithm.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::engine::Engine;
use crate::error::CoreError;
use crate::model::Shard;
use crate::ports::{GateValue, HistoryStore, RawInput, RawOutput, RawTx, RawTxSource, SnapshotCache, StateGate};

struct FakeHistory {
    shards: Mutex<HashMap<String, Vec<Shard>>>,
}

impl FakeHistory {
    fn new() -> Self {
        Self {
            shards: Mutex::new(HashMap::new()),
        }
    }

    fn seed(&self, address: &str, shards: Vec<Shard>) {
        self.shards.lock().unwrap().insert(address.to_string(), shards);
    }

    fn shard_count(&self, address: &str) -> usize {
        self.shards
            .lock()
            .unwrap()
            .get(address)
            .map(|v| v.len())
            .unwrap_or(0)
    }
}

impl HistoryStore for FakeHistory {
    fn put(&self, shard: &Shard) -> Result<(), CoreError> {
        self.shards
            .lock()
            .unwrap()
            .entry(shard.address.clone())
            .or_default()
            .push(shard.clone());
        Ok(())
    }

    fn load_shards(&self, address: &str) -> Result<Vec<Shard>, CoreError> {
        Ok(self
            .shards
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .unwrap_or_default())
    }
}

struct FakeCache {
    entries: Mutex<HashMap<String, Shard>>,
}

impl FakeCache {
    fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }
}

impl SnapshotCache for FakeCache {
    fn get(&self, key: &str) -> Result<Option<Shard>, CoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn put(&self, key: &str, shard: &Shard, _ttl_secs: u64) -> Result<(), CoreError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), shard.clone());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CoreError> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

struct FakeGate {
    value: GateValue,
    deleted: Mutex<Vec<String>>,
}

impl FakeGate {
    fn new(value: GateValue) -> Self {
        Self {
            value,
            deleted: Mutex::new(Vec::new()),
        }
    }
}

impl StateGate for FakeGate {
    fn get(&self, _key: &str) -> Result<GateValue, CoreError> {
        Ok(self.value)
    }

    fn mark_existing(&self, _key: &str) -> Result<(), CoreError> {
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CoreError> {
        self.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }
}

/// Returns a fixed page on the first call, then errors — models an
/// upstream connection dropping mid-pagination.
enum FakeSource {
    Pages(Mutex<Vec<Vec<RawTx>>>),
    FailAfter(Mutex<Vec<Vec<RawTx>>>),
}

impl RawTxSource for FakeSource {
    fn search_raw_transactions(
        &self,
        _address: &str,
        _skip: u64,
        _count: u64,
    ) -> Result<Vec<RawTx>, CoreError> {
        match self {
            FakeSource::Pages(pages) => Ok(pages.lock().unwrap().pop().unwrap_or_default()),
            FakeSource::FailAfter(pages) => {
                let mut pages = pages.lock().unwrap();
                if pages.is_empty() {
                    Err(CoreError::Dependency(Box::new(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        "upstream connection dropped",
                    ))))
                } else {
                    Ok(pages.remove(0))
                }
            }
        }
    }
}

fn tx(txid: &str, confirmations: u32, vin: Vec<RawInput>, vout: Vec<RawOutput>) -> RawTx {
    RawTx {
        txid: txid.to_string(),
        block_time: 1_541_316_014,
        confirmations,
        vin,
        vout,
    }
}

fn pay(address: &str, value: i64) -> RawOutput {
    RawOutput {
        value,
        script_pubkey: "76a914322422226b88ac".to_string(),
        addresses: vec![address.to_string()],
    }
}

fn elsewhere(value: i64) -> RawOutput {
    RawOutput {
        value,
        script_pubkey: "76a914000000000088ac".to_string(),
        addresses: vec!["someone-else".to_string()],
    }
}

fn spend(address: &str, prev_txid: &str, prev_vout: u32) -> RawInput {
    RawInput {
        prev_txid: prev_txid.to_string(),
        prev_vout,
        prev_addresses: vec![address.to_string()],
    }
}

const ADDR: &str = "15a7wZQhCeQ457KzxRZbeJ8jobb6yMVubR";

fn five_tx_fixture() -> Vec<RawTx> {
    vec![
        tx("tx1", 10, vec![], vec![pay(ADDR, 1_000_000)]),
        tx("tx2", 10, vec![spend(ADDR, "tx1", 0)], vec![pay(ADDR, 2_000_000)]),
        tx("tx3", 10, vec![spend(ADDR, "tx2", 0)], vec![pay(ADDR, 3_000_000)]),
        tx("tx4", 10, vec![spend(ADDR, "tx3", 0)], vec![pay(ADDR, 4_000_000)]),
        tx(
            "tx5",
            10,
            vec![spend(ADDR, "tx4", 0)],
            vec![elsewhere(1_000_000), pay(ADDR, 6_292_938)],
        ),
    ]
}

fn engine_for(
    history: Arc<FakeHistory>,
    cache: Arc<FakeCache>,
    source: FakeSource,
    gate: GateValue,
) -> (Engine, Arc<FakeGate>) {
    let gate = Arc::new(FakeGate::new(gate));
    let engine = Engine::new(history, cache, Arc::new(source), gate.clone());
    (engine, gate)
}

#[test]
fn s1_empty_address_new_gate_drained_upstream() {
    let history = Arc::new(FakeHistory::new());
    let cache = Arc::new(FakeCache::new());
    let (engine, gate) = engine_for(
        history.clone(),
        cache.clone(),
        FakeSource::Pages(Mutex::new(vec![vec![]])),
        GateValue::New,
    );

    let view = engine.reconstruct(ADDR, "all").unwrap();
    assert_eq!(view.subtotal_all, 0);
    assert!(view.transactions.is_empty());
    assert!(view.unspent_outputs().is_empty());
    assert_eq!(history.shard_count(ADDR), 0);
    assert!(!cache.contains(&crate::keys::cache_key(ADDR, "all")));
    assert_eq!(gate.deleted.lock().unwrap().len(), 1);
}

#[test]
fn s2_first_time_address_five_confirmed_transactions() {
    let history = Arc::new(FakeHistory::new());
    let cache = Arc::new(FakeCache::new());
    let (engine, _gate) = engine_for(
        history.clone(),
        cache.clone(),
        FakeSource::Pages(Mutex::new(vec![five_tx_fixture()])),
        GateValue::New,
    );

    let view = engine.reconstruct(ADDR, "all").unwrap();
    assert_eq!(view.subtotal_all, 6_292_938);
    assert_eq!(
        view.transactions,
        vec!["tx1", "tx2", "tx3", "tx4", "tx5"]
    );
    let unspents = view.unspent_outputs();
    assert_eq!(unspents.len(), 1);
    assert_eq!(unspents[0].txid, "tx5");
    assert_eq!(unspents[0].vout, 1);
    assert_eq!(unspents[0].amount, 6_292_938);

    assert_eq!(history.shard_count(ADDR), 1);
    assert!(cache.contains(&crate::keys::cache_key(ADDR, "all")));
}

#[test]
fn s3_pending_transaction_counted_live_but_not_durable() {
    let mut feed = five_tx_fixture();
    feed[2].confirmations = 3; // tx3 drops below the durability threshold

    let history = Arc::new(FakeHistory::new());
    let cache = Arc::new(FakeCache::new());
    let (engine, _gate) = engine_for(
        history.clone(),
        cache.clone(),
        FakeSource::Pages(Mutex::new(vec![feed])),
        GateValue::New,
    );

    let view = engine.reconstruct(ADDR, "all").unwrap();
    // Live view is unaffected by the confirmation count of an
    // individual transaction, as long as it isn't zero.
    assert_eq!(view.subtotal_all, 6_292_938);
    assert_eq!(view.unspent_outputs().len(), 1);

    let shards = history.load_shards(ADDR).unwrap();
    assert_eq!(shards.len(), 1);
    let shard = &shards[0];
    assert_eq!(shard.transactions, vec!["tx1", "tx2", "tx4", "tx5"]);
    assert!(!shard.unspent_amounts.contains_key("tx3+0"));
}

#[test]
fn s4_double_spend_of_the_same_outpoint_is_corrupted_history() {
    let history = Arc::new(FakeHistory::new());
    let cache = Arc::new(FakeCache::new());

    let mut prior = Shard::empty(ADDR);
    prior.timestamp = 1;
    prior.subtotal = 500;
    prior.unspent_amounts.insert("k1".to_string(), 500);
    prior.unspents.push(crate::model::Unspent {
        txid: "k1tx".to_string(),
        vout: 0,
        script_pubkey: "76a9".to_string(),
        amount: 500,
        block_time: 1,
    });
    prior.spents.insert("k1".to_string(), false);
    prior.transactions.push("k1tx".to_string());
    prior.skipped = 1;
    history.seed(ADDR, vec![prior]);

    let feed = vec![
        tx("spend-1", 10, vec![spend(ADDR, "k1tx", 0)], vec![]),
        tx("spend-2", 10, vec![spend(ADDR, "k1tx", 0)], vec![]),
    ];

    let (engine, _gate) = engine_for(
        history.clone(),
        cache.clone(),
        FakeSource::Pages(Mutex::new(vec![feed])),
        GateValue::Existing,
    );

    let err = engine.reconstruct(ADDR, "all").unwrap_err();
    assert!(err.is_corrupted_history());
    assert_eq!(history.shard_count(ADDR), 1); // no new shard appended
}

#[test]
fn s5_cache_miss_falls_back_to_history_and_rewarms_cache() {
    let history = Arc::new(FakeHistory::new());
    let cache = Arc::new(FakeCache::new());

    let mut shards = Vec::new();
    for i in 0..3 {
        let mut s = Shard::empty(ADDR);
        s.timestamp = i + 1;
        s.subtotal = 1_000;
        s.skipped = (i + 1) as u64;
        s.transactions.push(format!("hist-tx-{i}"));
        shards.push(s);
    }
    history.seed(ADDR, shards);

    let (engine, _gate) = engine_for(
        history.clone(),
        cache.clone(),
        FakeSource::Pages(Mutex::new(vec![vec![]])),
        GateValue::Existing,
    );

    let view = engine.reconstruct(ADDR, "all").unwrap();
    assert_eq!(view.subtotal_all, 3_000);
    assert_eq!(history.shard_count(ADDR), 3); // no new shard written
    assert!(cache.contains(&crate::keys::cache_key(ADDR, "all")));
}

#[test]
fn s7_ordinary_spend_after_a_prior_non_persistent_self_spend_is_not_a_double_spend() {
    let history = Arc::new(FakeHistory::new());
    let cache = Arc::new(FakeCache::new());

    // R1: fund K with 10 confirmations, then spend it with only 3 -
    // the spend is live but must not be written into the durable shard.
    let feed1 = vec![
        tx("fund", 10, vec![], vec![pay(ADDR, 1_000_000)]),
        tx("spend", 3, vec![spend(ADDR, "fund", 0)], vec![]),
    ];
    let (engine1, _gate1) = engine_for(
        history.clone(),
        cache.clone(),
        FakeSource::Pages(Mutex::new(vec![feed1])),
        GateValue::New,
    );
    engine1.reconstruct(ADDR, "all").unwrap();

    let shards = history.load_shards(ADDR).unwrap();
    assert_eq!(shards.len(), 1);
    assert_eq!(shards[0].spents.get("fund+0"), Some(&false));

    // R2: the same spend now confirms past the durability threshold.
    // It must close out "fund+0" rather than being rejected as a
    // double-spend of an already-spent durable outpoint.
    let feed2 = vec![tx("spend", 10, vec![spend(ADDR, "fund", 0)], vec![])];
    let (engine2, _gate2) = engine_for(
        history.clone(),
        cache.clone(),
        FakeSource::Pages(Mutex::new(vec![feed2])),
        GateValue::Existing,
    );
    let view = engine2.reconstruct(ADDR, "all").unwrap();
    assert_eq!(view.subtotal_all, 0);
    assert_eq!(history.shard_count(ADDR), 2);
}

#[test]
fn s8_shadow_spend_of_an_unspent_output_from_an_older_shard_folds_cleanly() {
    let history = Arc::new(FakeHistory::new());
    let cache = Arc::new(FakeCache::new());

    let feed1 = vec![tx("fund", 10, vec![], vec![pay(ADDR, 500)])];
    let (engine1, _gate1) = engine_for(
        history.clone(),
        cache.clone(),
        FakeSource::Pages(Mutex::new(vec![feed1])),
        GateValue::New,
    );
    engine1.reconstruct(ADDR, "all").unwrap();
    assert_eq!(history.load_shards(ADDR).unwrap()[0].spents.get("fund+0"), Some(&false));

    let feed2 = vec![tx("spend", 10, vec![spend(ADDR, "fund", 0)], vec![])];
    let (engine2, _gate2) = engine_for(
        history.clone(),
        cache.clone(),
        FakeSource::Pages(Mutex::new(vec![feed2])),
        GateValue::Existing,
    );
    let view = engine2.reconstruct(ADDR, "all").unwrap();
    assert_eq!(view.subtotal_all, 0);
    assert_eq!(history.shard_count(ADDR), 2);
}

#[test]
fn s9_persistent_spend_of_a_still_pending_output_is_corrupted_history() {
    let history = Arc::new(FakeHistory::new());
    let cache = Arc::new(FakeCache::new());

    let feed = vec![
        tx("fund", 3, vec![], vec![pay(ADDR, 500)]),
        tx("spend", 10, vec![spend(ADDR, "fund", 0)], vec![]),
    ];
    let (engine, _gate) = engine_for(
        history.clone(),
        cache.clone(),
        FakeSource::Pages(Mutex::new(vec![feed])),
        GateValue::New,
    );

    let err = engine.reconstruct(ADDR, "all").unwrap_err();
    assert!(err.is_corrupted_history());
    assert_eq!(history.shard_count(ADDR), 0);
}

#[test]
fn s6_upstream_timeout_mid_pagination_surfaces_dependency_error() {
    let history = Arc::new(FakeHistory::new());
    let cache = Arc::new(FakeCache::new());

    let page = |n: usize| -> Vec<RawTx> {
        (0..n)
            .map(|i| tx(&format!("page-tx-{i}"), 10, vec![], vec![pay(ADDR, 1)]))
            .collect()
    };
    let pages = vec![page(crate::engine::MAX_PAGE as usize), page(crate::engine::MAX_PAGE as usize)];

    let (engine, gate) = engine_for(
        history.clone(),
        cache.clone(),
        FakeSource::FailAfter(Mutex::new(pages)),
        GateValue::New,
    );

    let err = engine.reconstruct(ADDR, "all").unwrap_err();
    assert!(matches!(err, CoreError::Dependency(_)));
    assert_eq!(history.shard_count(ADDR), 0);
    assert_eq!(gate.deleted.lock().unwrap().len(), 1);
}
