//! Deterministic key formation (outpoint keys, state keys, cache keys).

/// Canonical identity of an unspent output: `txid+index`.
pub fn outpoint_key(txid: &str, vout: u32) -> String {
    format!("{txid}+{vout}")
}

/// Key under which the external scheduler's state gate is stored for an address/task pair.
pub fn state_key(address: &str, op: &str) -> String {
    format!("{address}+{op}")
}

/// Key under which a snapshot is cached for an address/task pair.
pub fn cache_key(address: &str, op: &str) -> String {
    format!("{address}:cache+{op}")
}
