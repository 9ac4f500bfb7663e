use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::SimulationLimits;
use crate::functions::{Capabilities, HttpMethod, HttpRequest, HttpResponse};
use crate::util::Error;
use crate::{bail, log_debug};

/// Local stand-in for the oracle network's execution host: real HTTP, with
/// the same request budget and size caps the network applies.
pub struct SandboxHost {
    client: Client,
    limits: SimulationLimits,
    requests_made: AtomicUsize,
}

impl SandboxHost {
    pub fn new(limits: SimulationLimits) -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(concat!("monobank-functions/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, limits))
    }

    pub fn with_client(client: Client, limits: SimulationLimits) -> Self {
        Self {
            client,
            limits,
            requests_made: AtomicUsize::new(0),
        }
    }

    pub fn requests_made(&self) -> usize {
        self.requests_made.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Capabilities for SandboxHost {
    async fn make_http_request(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        let made = self.requests_made.fetch_add(1, Ordering::SeqCst) + 1;
        if made > self.limits.max_http_requests {
            bail!(
                Limit,
                "exceeded the limit of {} HTTP requests",
                self.limits.max_http_requests
            );
        }

        let timeout_ms = request
            .timeout_ms
            .unwrap_or(self.limits.max_http_request_duration_ms)
            .min(self.limits.max_http_request_duration_ms);
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        if let Some(data) = &request.data {
            builder = builder.json(data);
        }

        log_debug!("{} {}", request.method, request.url);
        let mut response = builder
            .timeout(Duration::from_millis(timeout_ms))
            .send()
            .await?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.to_string(), value.to_string()))
            })
            .collect();

        let limit = self.limits.max_http_response_bytes;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            bail!(Limit, "response from {} exceeds the {} byte limit", request.url, limit);
        }
        // Bodies without a declared length are capped while streaming.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > limit {
                bail!(Limit, "response from {} exceeds the {} byte limit", request.url, limit);
            }
            body.extend_from_slice(&chunk);
        }

        if !status.is_success() {
            bail!(
                Transport,
                "request to {} failed with status {}",
                request.url,
                status.as_u16()
            );
        }

        let data = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
        };
        Ok(HttpResponse {
            status: status.as_u16(),
            headers,
            data,
        })
    }
}
