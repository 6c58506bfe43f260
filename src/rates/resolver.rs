use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::sizing::ConversionContext;
use crate::models::Instrument;

/// What to assume for a cross pair when no live rate is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Rate 1.0 — the flat "$10 per point per standard FX lot"
    /// approximation. The default.
    FlatRate,
    /// Estimate the quote→account rate as the reciprocal of the entry
    /// price, the constant-over-price variant. Only meaningful for
    /// crosses whose base leg trades near par with the account
    /// currency.
    PriceDerived,
}

impl FallbackPolicy {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "price" | "price_derived" => FallbackPolicy::PriceDerived,
            _ => FallbackPolicy::FlatRate,
        }
    }
}

/// Tag handed out when a lookup is issued. Responses carry it back so
/// the resolver can tell current answers from superseded ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateRequest {
    pub generation: u64,
    pub symbol: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRate {
    pub symbol: String,
    pub rate: f64,
    pub fetched_at: DateTime<Utc>,
}

/// Holds the single piece of state that survives between
/// recomputations: the last successfully fetched cross rate, tagged
/// with the instrument it belongs to.
///
/// Lookups are generation-counted. Only a response matching the newest
/// generation is applied; anything older is discarded, so a slow
/// response for a previously selected instrument can never overwrite
/// the current one.
pub struct CrossRateResolver {
    account_currency: String,
    fallback: FallbackPolicy,
    generation: u64,
    current: Option<ResolvedRate>,
}

impl CrossRateResolver {
    pub fn new(account_currency: impl Into<String>, fallback: FallbackPolicy) -> Self {
        Self {
            account_currency: account_currency.into(),
            fallback,
            generation: 0,
            current: None,
        }
    }

    pub fn account_currency(&self) -> &str {
        &self.account_currency
    }

    pub fn current_rate(&self) -> Option<&ResolvedRate> {
        self.current.as_ref()
    }

    /// Direct and inverse quotes need no external rate: the sizing
    /// formula covers both without conversion.
    pub fn needs_lookup(&self, instrument: &Instrument) -> bool {
        !instrument.is_quoted_in(&self.account_currency)
            && !instrument.is_based_in(&self.account_currency)
    }

    /// Issue a tagged lookup for the instrument's quote currency.
    /// Supersedes any lookup still in flight.
    pub fn begin_lookup(&mut self, instrument: &Instrument) -> RateRequest {
        self.generation += 1;
        debug!(
            symbol = %instrument.symbol,
            generation = self.generation,
            "issuing cross-rate lookup"
        );
        RateRequest {
            generation: self.generation,
            symbol: instrument.symbol.clone(),
            from: instrument.quote_currency().to_string(),
            to: self.account_currency.clone(),
        }
    }

    /// Apply a lookup response. Returns true only when a fresh rate
    /// was stored; stale and failed responses leave the fallback in
    /// charge.
    pub fn apply(&mut self, request: &RateRequest, result: Result<f64>) -> bool {
        if request.generation != self.generation {
            debug!(
                symbol = %request.symbol,
                generation = request.generation,
                current = self.generation,
                "discarding stale rate response"
            );
            return false;
        }

        match result {
            Ok(rate) if rate.is_finite() && rate > 0.0 => {
                debug!(symbol = %request.symbol, rate, "applied cross rate");
                self.current = Some(ResolvedRate {
                    symbol: request.symbol.clone(),
                    rate,
                    fetched_at: Utc::now(),
                });
                true
            }
            Ok(rate) => {
                warn!(symbol = %request.symbol, rate, "ignoring non-positive rate");
                self.drop_rate_unless_for(&request.symbol);
                false
            }
            Err(e) => {
                warn!(
                    symbol = %request.symbol,
                    error = %e,
                    "rate lookup failed, using fallback"
                );
                self.drop_rate_unless_for(&request.symbol);
                false
            }
        }
    }

    /// A failed refresh keeps the last good rate for the instrument it
    /// belongs to; a stale rate for a different instrument is dropped
    /// so the fallback takes over.
    fn drop_rate_unless_for(&mut self, symbol: &str) {
        if self
            .current
            .as_ref()
            .is_some_and(|c| c.symbol != symbol)
        {
            self.current = None;
        }
    }

    /// Conversion context for one recomputation. Falls back per policy
    /// when the stored rate is missing or belongs to another
    /// instrument.
    pub fn context_for(&self, instrument: &Instrument, entry: f64) -> ConversionContext<'_> {
        if !self.needs_lookup(instrument) {
            return ConversionContext::direct(&self.account_currency);
        }

        if let Some(current) = &self.current {
            if current.symbol == instrument.symbol {
                return ConversionContext::with_rate(&self.account_currency, current.rate);
            }
        }

        let rate = match self.fallback {
            FallbackPolicy::FlatRate => 1.0,
            FallbackPolicy::PriceDerived => {
                if entry > 0.0 {
                    1.0 / entry
                } else {
                    1.0
                }
            }
        };
        ConversionContext::with_rate(&self.account_currency, rate)
    }
}
