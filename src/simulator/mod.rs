//! Runs a request's script locally, the way the oracle network would, and
//! reports either the encoded response or the error string.

mod sandbox;

pub use sandbox::SandboxHost;

use std::time::Duration;

use crate::functions::{Capabilities, Secrets};
use crate::request::RequestConfig;
use crate::util::{self, Error};
use crate::{error, log_debug};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationLimits {
    pub max_http_requests: usize,
    pub max_http_request_duration_ms: u64,
    pub max_execution_time_ms: u64,
    pub max_http_response_bytes: usize,
    /// Cap on the encoded value a script may return.
    pub max_response_bytes: usize,
}

impl Default for SimulationLimits {
    fn default() -> Self {
        Self {
            max_http_requests: 5,
            max_http_request_duration_ms: 9_000,
            max_execution_time_ms: 10_000,
            max_http_response_bytes: 2 * 1024 * 1024,
            max_response_bytes: 256,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimulationResult {
    pub response_bytes_hexstring: Option<String>,
    pub error_string: Option<String>,
}

impl SimulationResult {
    fn from_outcome(outcome: Result<Vec<u8>, Error>) -> Self {
        match outcome {
            Ok(bytes) => Self {
                response_bytes_hexstring: Some(util::to_hex(&bytes)),
                error_string: None,
            },
            Err(err) => {
                log_debug!("script failed: {:?}", err);
                Self {
                    response_bytes_hexstring: None,
                    error_string: Some(err.to_string()),
                }
            }
        }
    }
}

/// Simulates `config` against the live network through a [`SandboxHost`].
pub async fn simulate_script(config: &RequestConfig, limits: &SimulationLimits) -> SimulationResult {
    match SandboxHost::new(limits.clone()) {
        Ok(host) => simulate_with_host(config, &host, limits).await,
        Err(err) => SimulationResult::from_outcome(Err(err)),
    }
}

pub async fn simulate_with_host(
    config: &RequestConfig,
    host: &dyn Capabilities,
    limits: &SimulationLimits,
) -> SimulationResult {
    let no_secrets = Secrets::new();
    let secrets = config.secrets().unwrap_or(&no_secrets);
    let execution = config.source().execute(host, secrets);

    let outcome = match tokio::time::timeout(
        Duration::from_millis(limits.max_execution_time_ms),
        execution,
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(_) => Err(error!(
            Limit,
            "script exceeded the {} ms execution limit",
            limits.max_execution_time_ms
        )),
    };

    let outcome = outcome.and_then(|bytes| {
        if bytes.len() > limits.max_response_bytes {
            Err(error!(
                Limit,
                "returned {} bytes, over the {} byte limit",
                bytes.len(),
                limits.max_response_bytes
            ))
        } else {
            Ok(bytes)
        }
    });
    SimulationResult::from_outcome(outcome)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use async_trait::async_trait;

    use super::*;
    use crate::functions::host::mock::MockHost;
    use crate::functions::{HttpRequest, HttpResponse};
    use crate::request::{decode_result, ReturnType};

    #[tokio::test]
    async fn successful_run_yields_hex() {
        let host = MockHost::new().route(
            "https://api.monobank.ua/bank/currency",
            json!([{"currencyCodeA": 840, "currencyCodeB": 980, "rateBuy": 39.5, "rateSell": 39.8}]),
        );
        let config = RequestConfig::usd_exchange_rate("https://api.monobank.ua");
        let result = simulate_with_host(&config, &host, &SimulationLimits::default()).await;
        assert_eq!(result.error_string, None);
        let hex = result.response_bytes_hexstring.unwrap();
        assert_eq!(hex.len(), 2 + 64);
        assert_eq!(
            decode_result(&hex, ReturnType::Uint256).unwrap().to_string(),
            "39650000000000000000"
        );
    }

    #[tokio::test]
    async fn script_errors_become_error_strings() {
        let config = RequestConfig::off_chain_collateral("https://api.monobank.ua", None, None);
        let result = simulate_with_host(&config, &MockHost::new(), &SimulationLimits::default()).await;
        assert_eq!(result.response_bytes_hexstring, None);
        assert_eq!(result.error_string.as_deref(), Some("monoApiKey is not set"));
    }

    #[tokio::test]
    async fn oversized_returns_are_refused() {
        let host = MockHost::new().route(
            "https://api.monobank.ua/bank/currency",
            json!([{"currencyCodeA": 840, "currencyCodeB": 980, "rateBuy": 1.0, "rateSell": 1.0}]),
        );
        let limits = SimulationLimits {
            max_response_bytes: 16,
            ..SimulationLimits::default()
        };
        let config = RequestConfig::usd_exchange_rate("https://api.monobank.ua");
        let result = simulate_with_host(&config, &host, &limits).await;
        assert!(result
            .error_string
            .unwrap()
            .contains("over the 16 byte limit"));
    }

    /// Never answers.
    struct StalledHost;

    #[async_trait]
    impl Capabilities for StalledHost {
        async fn make_http_request(&self, _request: HttpRequest) -> Result<HttpResponse, Error> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn stalled_scripts_hit_the_execution_limit() {
        let limits = SimulationLimits {
            max_execution_time_ms: 50,
            ..SimulationLimits::default()
        };
        let config = RequestConfig::usd_exchange_rate("https://api.monobank.ua");
        let result = simulate_with_host(&config, &StalledHost, &limits).await;
        assert_eq!(result.response_bytes_hexstring, None);
        assert_eq!(
            result.error_string.as_deref(),
            Some("script exceeded the 50 ms execution limit")
        );
    }
}
