use serde::{Deserialize, Serialize};

use crate::rates::FallbackPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Currency all monetary outputs are expressed in.
    pub account_currency: String,

    /// Base URL of the conversion-rate service, queried with
    /// `?from=XXX&to=YYY`.
    pub rate_api_url: String,

    /// Cross-pair assumption when no live rate is available.
    pub fallback_policy: FallbackPolicy,

    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        Config {
            account_currency: env("ACCOUNT_CURRENCY", "USD").to_uppercase(),
            rate_api_url: env(
                "RATE_API_URL",
                "https://api.exchangerate-api.com/v4/latest",
            ),
            fallback_policy: FallbackPolicy::parse(&env("RATE_FALLBACK", "flat")),
            log_level: env("LOG_LEVEL", "INFO"),
        }
    }
}
