use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use primitive_types::U256;
use serde_json::Value;

use super::encoding;
use crate::util::Error;

/// Named credentials injected by the execution host.
pub type Secrets = BTreeMap<String, String>;

/// Only GET and POST are available to scripts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => f.write_str("GET"),
            HttpMethod::Post => f.write_str("POST"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
    pub data: Option<Value>,
    /// Per-request timeout; the host default applies when unset.
    pub timeout_ms: Option<u64>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            headers: Vec::new(),
            params: Vec::new(),
            data: None,
            timeout_ms: None,
        }
    }

    pub fn post(url: impl Into<String>, data: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            data: Some(data),
            ..Self::get(url)
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub data: Value,
}

/// What the execution host lends to a script: outbound HTTP and the
/// return-value encoder.
#[async_trait]
pub trait Capabilities: Send + Sync {
    /// Performs one request. Non-2xx statuses are returned as transport errors.
    async fn make_http_request(&self, request: HttpRequest) -> Result<HttpResponse, Error>;

    fn encode_uint256(&self, value: U256) -> Vec<u8> {
        encoding::encode_uint256(value).to_vec()
    }
}
