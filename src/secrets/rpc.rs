use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::keys::Address;
use crate::util::{self, Error};
use crate::{bail, error, log_trace};

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct RpcReply {
    result: Option<Value>,
    error: Option<RpcError>,
}

/// Minimal JSON-RPC client for an EVM node.
pub struct JsonRpcProvider {
    url: String,
    client: Client,
    next_id: AtomicU64,
}

impl JsonRpcProvider {
    pub fn new(url: impl Into<String>) -> Result<Self, Error> {
        Ok(Self::with_client(Client::builder().build()?, url))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client,
            next_id: AtomicU64::new(1),
        }
    }

    pub async fn request(&self, method: &str, params: Value) -> Result<Value, Error> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        log_trace!("rpc {} #{}", method, id);
        let response = self.client.post(&self.url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            bail!(Transport, "{} failed with HTTP status {}", method, status.as_u16());
        }
        let reply: RpcReply = response.json().await?;
        if let Some(err) = reply.error {
            bail!(Transport, "{} failed: {} ({})", method, err.message, err.code);
        }
        reply
            .result
            .ok_or_else(|| error!(Transport, "{} returned no result", method))
    }

    pub async fn chain_id(&self) -> Result<u64, Error> {
        let result = self.request("eth_chainId", json!([])).await?;
        let quantity = result
            .as_str()
            .ok_or_else(|| error!(Encoding, "eth_chainId returned {}", result))?;
        parse_quantity(quantity)
    }

    /// `eth_call` against the latest block.
    pub async fn call(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>, Error> {
        let params = json!([
            { "to": to.to_lower_hex(), "data": util::to_hex(data) },
            "latest"
        ]);
        let result = self.request("eth_call", params).await?;
        let hex = result
            .as_str()
            .ok_or_else(|| error!(Encoding, "eth_call returned {}", result))?;
        util::from_hex(hex)
    }
}

pub fn parse_quantity(s: &str) -> Result<u64, Error> {
    let digits = util::strip_hex_prefix(s);
    u64::from_str_radix(digits, 16).map_err(|_| error!(Encoding, "invalid quantity {}", s))
}
