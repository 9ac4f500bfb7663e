use async_trait::async_trait;

use super::encoding::{non_negative, to_fixed_point};
use super::host::{Capabilities, HttpRequest, Secrets};
use super::monobank::{self, ClientInfo};
use super::Script;
use crate::util::Error;
use crate::{bail, error, log_debug};

pub const API_KEY_SECRET: &str = "monoApiKey";
pub const IBAN_SECRET: &str = "iban";

/// Reports the balance of one account, selected by IBAN, scaled by 10^16.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OffChainCollateral {
    api_url: String,
}

impl OffChainCollateral {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
        }
    }
}

impl Default for OffChainCollateral {
    fn default() -> Self {
        Self::new(monobank::API_URL)
    }
}

pub(crate) fn required<'a>(secrets: &'a Secrets, name: &str) -> Result<&'a str, Error> {
    match secrets.get(name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => bail!(Config, "{} is not set", name),
    }
}

#[async_trait]
impl Script for OffChainCollateral {
    const NAME: &'static str = "get-off-chain-collateral";

    async fn compute_value(
        &self,
        host: &dyn Capabilities,
        secrets: &Secrets,
    ) -> Result<Vec<u8>, Error> {
        let api_key = required(secrets, API_KEY_SECRET)?;
        let iban = required(secrets, IBAN_SECRET)?;

        let request = HttpRequest::get(monobank::endpoint(&self.api_url, monobank::CLIENT_INFO_PATH))
            .header("accept", "application/json")
            .header(monobank::TOKEN_HEADER, api_key);
        let response = host.make_http_request(request).await?;
        let client_info: ClientInfo = serde_json::from_value(response.data)?;
        log_debug!("{}: {} accounts returned", Self::NAME, client_info.accounts.len());

        let account = client_info
            .account_by_iban(iban)
            .ok_or_else(|| error!(Lookup, "no account matches the requested iban"))?;
        let collateral = to_fixed_point(non_negative(account.balance)?)?;
        Ok(host.encode_uint256(collateral))
    }
}
