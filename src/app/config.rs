use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::log::LogLevel;
use crate::functions::monobank;
use crate::secrets::{SECRETS_EXPIRATION_MINUTES, SEPOLIA_DON_ID, SEPOLIA_ROUTER_ADDRESS, TESTNET_GATEWAYS};
use crate::simulator::SimulationLimits;
use crate::util::Error;
use crate::{log_info, log_warn};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: LogLevel,
    pub monobank_api_url: String,
    pub router_address: String,
    pub don_id: String,
    pub gateway_urls: Vec<String>,
    pub secrets_expiration_minutes: u64,
    pub max_http_requests: usize,
    pub max_http_request_duration_ms: u64,
    pub max_execution_time_ms: u64,
    pub max_http_response_bytes: usize,
    pub max_response_bytes: usize,
}

impl Config {
    pub fn new() -> Self {
        let limits = SimulationLimits::default();
        Self {
            log_level: LogLevel::Info,
            monobank_api_url: monobank::API_URL.to_string(),
            router_address: SEPOLIA_ROUTER_ADDRESS.to_string(),
            don_id: SEPOLIA_DON_ID.to_string(),
            gateway_urls: TESTNET_GATEWAYS.iter().map(|url| url.to_string()).collect(),
            secrets_expiration_minutes: SECRETS_EXPIRATION_MINUTES,
            max_http_requests: limits.max_http_requests,
            max_http_request_duration_ms: limits.max_http_request_duration_ms,
            max_execution_time_ms: limits.max_execution_time_ms,
            max_http_response_bytes: limits.max_http_response_bytes,
            max_response_bytes: limits.max_response_bytes,
        }
    }

    pub fn simulation_limits(&self) -> SimulationLimits {
        SimulationLimits {
            max_http_requests: self.max_http_requests,
            max_http_request_duration_ms: self.max_http_request_duration_ms,
            max_execution_time_ms: self.max_execution_time_ms,
            max_http_response_bytes: self.max_http_response_bytes,
            max_response_bytes: self.max_response_bytes,
        }
    }

    /// Reads `path`, or falls back to the defaults and tries to write them
    /// there. Only a file that exists but does not parse is an error.
    pub fn load_or_create(path: &Path) -> Result<Self, Error> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let config = toml::from_str(&contents)?;
                log_info!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(_) => {
                let config = Config::new();
                match (|| -> Result<(), Error> {
                    let mut f = File::create(path)?;
                    f.write_all(toml::to_string(&config)?.as_bytes())?;
                    Ok(())
                })() {
                    Ok(_) => {
                        log_warn!("No config found; wrote defaults to {}", path.display());
                    }
                    Err(e) => {
                        log_warn!("Failed to create config file at {}: {}", path.display(), e);
                    }
                }
                Ok(config)
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
