use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

use crate::config::Config;
use crate::rates::{RateError, RateProvider};

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}

/// Conversion-rate lookup against a JSON HTTP service. One GET with
/// `from`/`to` query parameters, expecting the rate keyed by currency
/// code under a top-level `rates` field.
pub struct HttpRateProvider {
    client: Client,
    base_url: String,
}

impl HttpRateProvider {
    pub fn new(cfg: &Config) -> Self {
        Self::with_base_url(cfg.rate_api_url.clone())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    async fn fetch_rate(&self, from: &str, to: &str) -> Result<f64> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("from", from), ("to", to)])
            .send()
            .await
            .context("Failed to reach rate service")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RateError::BadStatus {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let data: RatesResponse = resp
            .json()
            .await
            .context("Failed to parse rate response")?;

        data.rates
            .get(to)
            .copied()
            .filter(|r| r.is_finite() && *r > 0.0)
            .ok_or_else(|| {
                RateError::MissingRate {
                    currency: to.to_string(),
                }
                .into()
            })
    }
}
