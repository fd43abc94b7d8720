//! Raw-transaction source adapter: a JSON-RPC 1.0 client talking to the
//! upstream ledger node's `searchrawtransactions` method.
//!
//! The transport is a small [`jsonrpc::Transport`] implementation over
//! `reqwest::blocking`, the same shape this codebase already uses for
//! its other JSON-RPC-speaking clients.

use std::fmt;
use std::time::Duration;

use jsonrpc::serde_json::value::RawValue;
use jsonrpc::{Client, Request, Response};
use serde::Deserialize;
use serde_json;

use addr_indexer_core::error::CoreError;
use addr_indexer_core::ports::{RawInput, RawOutput, RawTx, RawTxSource};

use crate::error::AdapterError;

/// Upstream error code signaling an address search has no more results.
const DRAINED_ERROR_CODE: i32 = -5;

struct ReqwestHttpTransport {
    url: String,
    agent: reqwest::blocking::Client,
    user: Option<String>,
    pass: Option<String>,
}

impl ReqwestHttpTransport {
    fn new(url: &str, user: Option<String>, pass: Option<String>, timeout: Duration) -> Self {
        let agent = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build http client");
        Self {
            url: url.to_string(),
            agent,
            user,
            pass,
        }
    }
}

impl jsonrpc::Transport for ReqwestHttpTransport {
    fn send_request(&self, request: Request) -> Result<Response, jsonrpc::Error> {
        let mut req = self.agent.post(&self.url).json(&request);
        if let Some(user) = &self.user {
            req = req.basic_auth(user, self.pass.clone());
        }
        let resp = req
            .send()
            .map_err(|e| jsonrpc::Error::Transport(Box::new(e)))?;
        resp.json()
            .map_err(|e| jsonrpc::Error::Transport(Box::new(e)))
    }

    fn send_notification(&self, request: Request) -> Result<(), jsonrpc::Error> {
        self.send_request(request).map(|_| ())
    }

    fn fmt_target(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[derive(Debug, Deserialize)]
struct PrevOutWire {
    #[serde(default)]
    addresses: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct VinWire {
    #[serde(rename = "txid")]
    prev_txid: Option<String>,
    #[serde(rename = "vout")]
    prev_vout: Option<u32>,
    #[serde(rename = "prevOut", default)]
    prev_out: Option<PrevOutWire>,
}

#[derive(Debug, Deserialize)]
struct ScriptPubKeyWire {
    hex: String,
    #[serde(default)]
    addresses: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct VoutWire {
    value: f64,
    #[serde(rename = "scriptPubKey")]
    script_pubkey: ScriptPubKeyWire,
}

#[derive(Debug, Deserialize)]
struct RawTxWire {
    txid: String,
    confirmations: Option<u32>,
    time: Option<i64>,
    #[serde(default)]
    vin: Vec<VinWire>,
    #[serde(default)]
    vout: Vec<VoutWire>,
}

/// Convert a display-unit amount to the smallest ledger unit, rounding
/// half away from zero.
fn to_smallest_unit(value: f64) -> i64 {
    (value * 100_000_000.0).round() as i64
}

impl From<RawTxWire> for RawTx {
    fn from(w: RawTxWire) -> Self {
        let vin = w
            .vin
            .into_iter()
            .filter_map(|v| {
                let prev_txid = v.prev_txid?;
                let prev_vout = v.prev_vout?;
                let prev_addresses = v.prev_out.map(|p| p.addresses).unwrap_or_default();
                Some(RawInput {
                    prev_txid,
                    prev_vout,
                    prev_addresses,
                })
            })
            .collect();
        let vout = w
            .vout
            .into_iter()
            .map(|v| RawOutput {
                value: to_smallest_unit(v.value),
                script_pubkey: v.script_pubkey.hex,
                addresses: v.script_pubkey.addresses,
            })
            .collect();
        RawTx {
            txid: w.txid,
            block_time: w.time.unwrap_or(0),
            confirmations: w.confirmations.unwrap_or(0),
            vin,
            vout,
        }
    }
}

/// JSON-RPC client calling the upstream node's `searchrawtransactions`.
pub struct JsonRpcRawTxSource {
    client: Client,
}

impl JsonRpcRawTxSource {
    /// Build a client against `url`, optionally authenticating with
    /// `user`/`pass`, failing requests after `timeout`.
    pub fn new(url: &str, user: Option<String>, pass: Option<String>, timeout: Duration) -> Self {
        let transport = ReqwestHttpTransport::new(url, user, pass, timeout);
        Self {
            client: Client::with_transport(transport),
        }
    }
}

impl RawTxSource for JsonRpcRawTxSource {
    fn search_raw_transactions(
        &self,
        address: &str,
        skip: u64,
        count: u64,
    ) -> Result<Vec<RawTx>, CoreError> {
        let params = serde_json::json!([address, 1, skip, count, 1_000_000_000u64, false]);
        let raw_params: Vec<Box<RawValue>> = match params {
            serde_json::Value::Array(values) => values
                .into_iter()
                .map(|v| RawValue::from_string(v.to_string()).expect("valid json"))
                .collect(),
            _ => unreachable!(),
        };
        let request = self
            .client
            .build_request("searchrawtransactions", &raw_params);

        let response = match self.client.send_request(request) {
            Ok(r) => r,
            Err(e) => return Err(AdapterError::JsonRpc(e).into()),
        };

        if let Some(err) = response.error.as_ref() {
            if err.code == DRAINED_ERROR_CODE {
                return Ok(Vec::new());
            }
            return Err(AdapterError::MalformedResponse(format!(
                "upstream rpc error {}: {}",
                err.code, err.message
            ))
            .into());
        }

        let wire: Vec<RawTxWire> = response
            .result()
            .map_err(|e| AdapterError::MalformedResponse(e.to_string()))?;

        Ok(wire.into_iter().map(RawTx::from).collect())
    }
}
