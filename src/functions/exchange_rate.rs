use async_trait::async_trait;
use primitive_types::U256;

use super::encoding::to_fixed_point;
use super::host::{Capabilities, HttpRequest, Secrets};
use super::monobank::{self, CurrencyRate, UAH_CODE, USD_CODE};
use super::Script;
use crate::util::Error;
use crate::{bail, error, log_debug};

/// Reports the USD/UAH midpoint rate in kopiykas, scaled by 10^16.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UsdExchangeRate {
    api_url: String,
}

impl UsdExchangeRate {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
        }
    }
}

impl Default for UsdExchangeRate {
    fn default() -> Self {
        Self::new(monobank::API_URL)
    }
}

pub fn midpoint(rate_buy: f64, rate_sell: f64) -> f64 {
    (rate_buy + rate_sell) / 2.0
}

/// Rounds a rate to whole hundredths, half away from zero.
///
/// One `f64::EPSILON` is added first so that rates sitting on a half-cent
/// boundary whose binary form falls just short of it still round up. Above
/// roughly 1.0 the epsilon is smaller than the spacing between adjacent
/// doubles and the rate rounds as represented.
pub fn to_cents(rate: f64) -> Result<u64, Error> {
    let cents = ((rate + f64::EPSILON) * 100.0).round();
    if !cents.is_finite() || cents < 0.0 || cents >= u64::MAX as f64 {
        bail!(Encoding, "rate {} cannot be expressed in cents", rate);
    }
    Ok(cents as u64)
}

#[async_trait]
impl Script for UsdExchangeRate {
    const NAME: &'static str = "get-usd-exchange-rate";

    async fn compute_value(
        &self,
        host: &dyn Capabilities,
        _secrets: &Secrets,
    ) -> Result<Vec<u8>, Error> {
        let request = HttpRequest::get(monobank::endpoint(&self.api_url, monobank::CURRENCY_PATH))
            .header("accept", "application/json");
        let response = host.make_http_request(request).await?;
        let rates: Vec<CurrencyRate> = serde_json::from_value(response.data)?;

        let pair = monobank::find_pair(&rates, USD_CODE, UAH_CODE)
            .ok_or_else(|| error!(Lookup, "no rate for currency pair {}/{}", USD_CODE, UAH_CODE))?;
        let (rate_buy, rate_sell) = match (pair.rate_buy, pair.rate_sell) {
            (Some(buy), Some(sell)) => (buy, sell),
            _ => bail!(Lookup, "currency pair {}/{} has no buy/sell quote", USD_CODE, UAH_CODE),
        };

        let rate_in_cents = to_cents(midpoint(rate_buy, rate_sell))?;
        log_debug!("{}: buy {} sell {} -> {} cents", Self::NAME, rate_buy, rate_sell, rate_in_cents);
        Ok(host.encode_uint256(to_fixed_point(U256::from(rate_in_cents))?))
    }
}
