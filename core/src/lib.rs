#![deny(missing_docs)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]

//! The address-state reconstruction engine.
//!
//! Given a document-store history, a short-lived cache, and a live feed
//! of raw transactions, [`engine::Engine`] reconstructs a per-address
//! [`model::LiveView`] by applying confirmation-threshold rules,
//! detecting double-spends and corruption, and folding newly-confirmed
//! history into append-only [`model::Shard`]s.

pub mod engine;
pub mod error;
pub mod keys;
pub mod model;
pub mod ports;
pub mod query;
pub mod shard;

#[cfg(test)]
mod scenarios;
