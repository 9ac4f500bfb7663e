//! The scripts executed by the oracle network, written against an explicit
//! [`Capabilities`] object instead of host-injected globals.

pub mod collateral;
pub mod encoding;
pub mod exchange_rate;
pub mod host;
pub mod monobank;

use async_trait::async_trait;

pub use collateral::OffChainCollateral;
pub use exchange_rate::UsdExchangeRate;
pub use host::{Capabilities, HttpMethod, HttpRequest, HttpResponse, Secrets};

use crate::util::Error;

/// A single-shot computation: one invocation, at most a handful of HTTP
/// calls, one encoded return value.
#[async_trait]
pub trait Script: Send + Sync {
    const NAME: &'static str;

    async fn compute_value(
        &self,
        host: &dyn Capabilities,
        secrets: &Secrets,
    ) -> Result<Vec<u8>, Error>;
}
