pub mod http;
pub mod resolver;

pub use http::HttpRateProvider;
pub use resolver::{CrossRateResolver, FallbackPolicy, RateRequest, ResolvedRate};

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

/// Source of quote-currency → account-currency conversion rates.
/// Implementations must be safe to call repeatedly; the resolver
/// discards all but the newest response.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rate(&self, from: &str, to: &str) -> Result<f64>;
}

#[derive(Debug, Error)]
pub enum RateError {
    #[error("rate service returned status {status}: {body}")]
    BadStatus { status: u16, body: String },
    #[error("no {currency} rate in response")]
    MissingRate { currency: String },
}
