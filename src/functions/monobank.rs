use serde::{Deserialize, Serialize};

pub const API_URL: &str = "https://api.monobank.ua";
pub const CLIENT_INFO_PATH: &str = "/personal/client-info";
pub const CURRENCY_PATH: &str = "/bank/currency";
pub const TOKEN_HEADER: &str = "X-Token";

/// ISO 4217 numeric codes.
pub const USD_CODE: u16 = 840;
pub const UAH_CODE: u16 = 980;

pub fn endpoint(api_url: &str, path: &str) -> String {
    format!("{}{}", api_url.trim_end_matches('/'), path)
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub accounts: Vec<Account>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default)]
    pub id: String,
    pub iban: String,
    /// Minor currency units; negative on overdrawn credit accounts.
    pub balance: i64,
    #[serde(default)]
    pub currency_code: u16,
    #[serde(default)]
    pub credit_limit: i64,
}

impl ClientInfo {
    pub fn account_by_iban(&self, iban: &str) -> Option<&Account> {
        self.accounts.iter().find(|account| account.iban == iban)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyRate {
    pub currency_code_a: u16,
    pub currency_code_b: u16,
    #[serde(default)]
    pub date: i64,
    pub rate_buy: Option<f64>,
    pub rate_sell: Option<f64>,
    pub rate_cross: Option<f64>,
}

pub fn find_pair(rates: &[CurrencyRate], base: u16, quote: u16) -> Option<&CurrencyRate> {
    rates
        .iter()
        .find(|rate| rate.currency_code_a == base && rate.currency_code_b == quote)
}
