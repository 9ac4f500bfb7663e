use std::fmt;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use k256::PublicKey;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::abi;
use super::encrypt;
use super::rpc::{JsonRpcProvider, RpcError};
use crate::functions::Secrets;
use crate::keys::{Address, Wallet};
use crate::util::{self, Error, ErrorKind};
use crate::{bail, error, log_info, log_warn};

pub const SECRETS_SET_METHOD: &str = "secrets_set";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadRequest {
    pub encrypted_secrets_hexstring: String,
    pub slot_id: u8,
    pub gateway_urls: Vec<String>,
    pub minutes_until_expiration: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeResponse {
    pub success: bool,
    pub error_message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadResult {
    pub version: u64,
    pub success: bool,
    pub node_responses: Vec<NodeResponse>,
}

impl fmt::Display for UploadResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let accepted = self.node_responses.iter().filter(|r| r.success).count();
        write!(
            f,
            "version {}, {}/{} nodes accepted",
            self.version,
            accepted,
            self.node_responses.len()
        )
    }
}

/// The oracle network's secret-hosting service, as seen by this crate.
#[async_trait]
pub trait SecretsManager: Send {
    /// Resolves whatever network state encryption depends on.
    async fn initialize(&mut self) -> Result<(), Error>;

    /// Returns the encrypted credential set as a `0x` hex string.
    async fn encrypt_secrets(&self, secrets: &Secrets) -> Result<String, Error>;

    async fn upload_encrypted_secrets_to_don(
        &self,
        request: UploadRequest,
    ) -> Result<UploadResult, Error>;
}

#[derive(Debug, Serialize)]
struct StoredSecrets {
    slot_id: u8,
    version: u64,
    payload: String,
    expiration: u64,
}

#[derive(Debug, Deserialize)]
struct GatewayReply {
    result: Option<GatewayMessage>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct GatewayMessage {
    body: GatewayBody,
}

#[derive(Debug, Deserialize)]
struct GatewayBody {
    payload: GatewayPayload,
}

#[derive(Debug, Deserialize)]
struct GatewayPayload {
    #[serde(default)]
    node_responses: Vec<GatewayMessage>,
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error_message: Option<String>,
}

/// Unix millis `minutes` after `now_ms`.
fn expires_at(now_ms: u64, minutes: u64) -> Result<u64, Error> {
    minutes
        .checked_mul(60_000)
        .and_then(|ms| ms.checked_add(now_ms))
        .ok_or_else(|| error!(Config, "secrets expiration of {} minutes is out of range", minutes))
}

/// Talks to the router contract through `provider` and to the DON through
/// its HTTP gateways.
pub struct GatewaySecretsManager {
    provider: JsonRpcProvider,
    wallet: Wallet,
    router: Address,
    don_id: String,
    client: Client,
    don_public_key: Option<PublicKey>,
}

impl GatewaySecretsManager {
    pub fn new(
        provider: JsonRpcProvider,
        wallet: Wallet,
        router: Address,
        don_id: impl Into<String>,
    ) -> Result<Self, Error> {
        Ok(Self {
            provider,
            wallet,
            router,
            don_id: don_id.into(),
            client: Client::builder().build()?,
            don_public_key: None,
        })
    }

    /// Skips the on-chain lookup; used when the DON key is already known.
    pub fn with_don_public_key(mut self, key: PublicKey) -> Self {
        self.don_public_key = Some(key);
        self
    }

    fn build_message(&self, request: &UploadRequest, version: u64) -> Result<serde_json::Value, Error> {
        let encrypted = util::from_hex(&request.encrypted_secrets_hexstring)?;
        let stored = StoredSecrets {
            slot_id: request.slot_id,
            version,
            payload: general_purpose::STANDARD.encode(encrypted),
            expiration: expires_at(util::unix_time_millis(), request.minutes_until_expiration)?,
        };
        let storage_signature = self.wallet.sign_message(&serde_json::to_vec(&stored)?)?;

        let message_id = format!("{:016x}", rand::thread_rng().gen::<u64>());
        let body = json!({
            "message_id": message_id,
            "method": SECRETS_SET_METHOD,
            "don_id": self.don_id,
            "receiver": "",
            "sender": self.wallet.address().to_lower_hex(),
            "payload": {
                "slot_id": stored.slot_id,
                "version": stored.version,
                "payload": stored.payload,
                "expiration": stored.expiration,
                "signature": general_purpose::STANDARD.encode(storage_signature),
            },
        });
        let signature = self.wallet.sign_message(&serde_json::to_vec(&body)?)?;
        Ok(json!({
            "jsonrpc": "2.0",
            "id": message_id,
            "method": SECRETS_SET_METHOD,
            "params": {
                "body": body,
                "signature": util::to_hex(&signature),
            },
        }))
    }

    async fn send_to_gateway(
        &self,
        url: &str,
        message: &serde_json::Value,
        version: u64,
    ) -> Result<UploadResult, Error> {
        let response = self.client.post(url).json(message).send().await?;
        let status = response.status();
        if !status.is_success() {
            bail!(Transport, "gateway {} answered with status {}", url, status.as_u16());
        }
        let reply: GatewayReply = response.json().await?;
        if let Some(err) = reply.error {
            bail!(Transport, "gateway {} rejected the message: {} ({})", url, err.message, err.code);
        }
        let payload = reply
            .result
            .ok_or_else(|| error!(Transport, "gateway {} returned no result", url))?
            .body
            .payload;
        if let Some(message) = &payload.error_message {
            log_warn!("Gateway {} reported: {}", url, message);
        }

        let node_responses: Vec<NodeResponse> = payload
            .node_responses
            .into_iter()
            .map(|node| NodeResponse {
                success: node.body.payload.success,
                error_message: node.body.payload.error_message,
            })
            .collect();
        let success = !node_responses.is_empty() && node_responses.iter().all(|r| r.success);
        Ok(UploadResult {
            version,
            success,
            node_responses,
        })
    }
}

#[async_trait]
impl SecretsManager for GatewaySecretsManager {
    async fn initialize(&mut self) -> Result<(), Error> {
        if self.don_public_key.is_some() {
            return Ok(());
        }
        let chain_id = self.provider.chain_id().await?;
        log_info!("Connected to chain {}", chain_id);

        let don_id = abi::bytes32_from_str(&self.don_id)?;
        let reply = self
            .provider
            .call(&self.router, &abi::call_data("getContractById(bytes32)", &[don_id]))
            .await?;
        let coordinator = Address::from_word(&reply)?;
        log_info!("Coordinator for {} is {}", self.don_id, coordinator);

        let reply = self
            .provider
            .call(&coordinator, &abi::call_data("getDONPublicKey()", &[]))
            .await?;
        self.don_public_key = Some(encrypt::don_public_key(&abi::decode_bytes(&reply)?)?);
        Ok(())
    }

    async fn encrypt_secrets(&self, secrets: &Secrets) -> Result<String, Error> {
        let Some(key) = &self.don_public_key else {
            bail!(Config, "secrets manager is not initialized");
        };
        Ok(util::to_hex(&encrypt::encrypt_secrets(secrets, key)?))
    }

    async fn upload_encrypted_secrets_to_don(
        &self,
        request: UploadRequest,
    ) -> Result<UploadResult, Error> {
        if request.gateway_urls.is_empty() {
            bail!(Config, "no gateway urls configured");
        }
        let version = chrono::Utc::now().timestamp().max(0) as u64;
        let message = self.build_message(&request, version)?;

        for url in &request.gateway_urls {
            match self.send_to_gateway(url, &message, version).await {
                Ok(result) => return Ok(result),
                Err(err) if err.kind() == ErrorKind::Transport => {
                    log_warn!("Gateway {} failed: {}", url, err);
                }
                Err(err) => return Err(err),
            }
        }
        bail!(Transport, "none of the {} gateways accepted the upload", request.gateway_urls.len())
    }
}
