//! Provisioning of the banking credentials to the oracle network's
//! secret-hosting service.

pub mod abi;
pub mod encrypt;
pub mod manager;
pub mod prompt;
pub mod rpc;

pub use manager::{GatewaySecretsManager, NodeResponse, SecretsManager, UploadRequest, UploadResult};
pub use rpc::JsonRpcProvider;

use crate::functions::collateral::{API_KEY_SECRET, IBAN_SECRET};
use crate::functions::Secrets;
use crate::util::Error;
use crate::{bail, log_info};

pub const SECRETS_EXPIRATION_MINUTES: u64 = 1440 * 3;
pub const SEPOLIA_ROUTER_ADDRESS: &str = "0xb83E47C2bC239B3bf370bc41e1459A34b41238D0";
pub const SEPOLIA_DON_ID: &str = "fun-ethereum-sepolia-1";
pub const TESTNET_GATEWAYS: [&str; 2] = [
    "https://01.functions-gateway.testnet.chain.link/",
    "https://02.functions-gateway.testnet.chain.link/",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadOptions {
    pub slot_id: u8,
    pub gateway_urls: Vec<String>,
    pub minutes_until_expiration: u64,
}

/// The credential set the collateral script reads. Both values are required.
pub fn collect_secrets(api_key: Option<String>, iban: Option<String>) -> Result<Secrets, Error> {
    let mut secrets = Secrets::new();
    for (name, value) in [(API_KEY_SECRET, api_key), (IBAN_SECRET, iban)] {
        match value {
            Some(value) if !value.is_empty() => {
                secrets.insert(name.to_string(), value);
            }
            _ => bail!(Config, "{} is not set", name),
        }
    }
    Ok(secrets)
}

/// Encrypts `secrets` and stores them in the DON, returning the version the
/// slot now holds.
pub async fn upload_secrets<M>(
    manager: &mut M,
    secrets: &Secrets,
    options: &UploadOptions,
) -> Result<u64, Error>
where
    M: SecretsManager + ?Sized,
{
    manager.initialize().await?;

    let encrypted_secrets = manager.encrypt_secrets(secrets).await?;
    log_info!("Encrypted secrets: {}", encrypted_secrets);

    let upload = manager
        .upload_encrypted_secrets_to_don(UploadRequest {
            encrypted_secrets_hexstring: encrypted_secrets,
            slot_id: options.slot_id,
            gateway_urls: options.gateway_urls.clone(),
            minutes_until_expiration: options.minutes_until_expiration,
        })
        .await?;
    if !upload.success {
        bail!(Upload, "Failed to upload secrets to the DON");
    }

    log_info!("Secrets uploaded successfully, response from the DON: {}", upload);
    log_info!("DON hosted secrets version: {}", upload.version);
    Ok(upload.version)
}
