//! Static descriptions of the two requests, mirroring the fields the oracle
//! network's request format carries.

mod return_type;

pub use return_type::{decode_result, DecodedResult, ReturnType};

use std::fmt;

use crate::functions::collateral::{API_KEY_SECRET, IBAN_SECRET};
use crate::functions::{Capabilities, OffChainCollateral, Script, Secrets, UsdExchangeRate};
use crate::util::Error;

/// Where the source or the secrets of a request live. Discriminants match
/// the on-chain enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    Inline = 0,
    Remote = 1,
    DonHosted = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodeLanguage {
    JavaScript = 0,
}

/// The script a request runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    OffChainCollateral(OffChainCollateral),
    UsdExchangeRate(UsdExchangeRate),
}

impl Source {
    pub fn name(&self) -> &'static str {
        match self {
            Source::OffChainCollateral(_) => OffChainCollateral::NAME,
            Source::UsdExchangeRate(_) => UsdExchangeRate::NAME,
        }
    }

    pub async fn execute(
        &self,
        host: &dyn Capabilities,
        secrets: &Secrets,
    ) -> Result<Vec<u8>, Error> {
        match self {
            Source::OffChainCollateral(script) => script.compute_value(host, secrets).await,
            Source::UsdExchangeRate(script) => script.compute_value(host, secrets).await,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, PartialEq)]
pub struct RequestConfig {
    source: Source,
    code_location: Location,
    secrets: Option<Secrets>,
    secrets_location: Option<Location>,
    args: Vec<String>,
    code_language: CodeLanguage,
    expected_return_type: ReturnType,
}

impl RequestConfig {
    /// Balance of the account named by `iban`, read with `api_key`. Either
    /// credential may be absent here; the script reports which one is missing.
    pub fn off_chain_collateral(
        api_url: &str,
        api_key: Option<String>,
        iban: Option<String>,
    ) -> Self {
        let mut secrets = Secrets::new();
        if let Some(api_key) = api_key {
            secrets.insert(API_KEY_SECRET.to_string(), api_key);
        }
        if let Some(iban) = iban {
            secrets.insert(IBAN_SECRET.to_string(), iban);
        }
        Self {
            source: Source::OffChainCollateral(OffChainCollateral::new(api_url)),
            code_location: Location::Inline,
            secrets: Some(secrets),
            secrets_location: Some(Location::DonHosted),
            args: Vec::new(),
            code_language: CodeLanguage::JavaScript,
            expected_return_type: ReturnType::Uint256,
        }
    }

    pub fn usd_exchange_rate(api_url: &str) -> Self {
        Self {
            source: Source::UsdExchangeRate(UsdExchangeRate::new(api_url)),
            code_location: Location::Inline,
            secrets: None,
            secrets_location: None,
            args: Vec::new(),
            code_language: CodeLanguage::JavaScript,
            expected_return_type: ReturnType::Uint256,
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn code_location(&self) -> Location {
        self.code_location
    }

    pub fn secrets(&self) -> Option<&Secrets> {
        self.secrets.as_ref()
    }

    pub fn secrets_location(&self) -> Option<Location> {
        self.secrets_location
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn code_language(&self) -> CodeLanguage {
        self.code_language
    }

    pub fn expected_return_type(&self) -> ReturnType {
        self.expected_return_type
    }
}

// Prints secret names only, never their values.
impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field("source", &self.source)
            .field("code_location", &self.code_location)
            .field(
                "secrets",
                &self.secrets.as_ref().map(|s| s.keys().collect::<Vec<_>>()),
            )
            .field("secrets_location", &self.secrets_location)
            .field("args", &self.args)
            .field("code_language", &self.code_language)
            .field("expected_return_type", &self.expected_return_type)
            .finish()
    }
}
