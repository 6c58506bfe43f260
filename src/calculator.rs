use tracing::info;

use crate::config::Config;
use crate::core::sizing::{size_position, SizingResult};
use crate::models::{Instrument, SizerInputs};
use crate::rates::{CrossRateResolver, FallbackPolicy, RateProvider, RateRequest};

/// The seam between the engine and whatever shell drives it. The shell
/// calls `recompute` synchronously on every input change; cross-rate
/// lookups run separately and feed back in through the tagged
/// begin/complete pair, so a recompute never blocks on the network.
pub struct Calculator {
    provider: Box<dyn RateProvider>,
    resolver: CrossRateResolver,
}

impl Calculator {
    pub fn new(cfg: &Config, provider: Box<dyn RateProvider>) -> Self {
        info!(
            account_currency = %cfg.account_currency,
            fallback = ?cfg.fallback_policy,
            "calculator ready"
        );
        Self {
            provider,
            resolver: CrossRateResolver::new(cfg.account_currency.clone(), cfg.fallback_policy),
        }
    }

    pub fn with_account_currency(
        account_currency: impl Into<String>,
        fallback: FallbackPolicy,
        provider: Box<dyn RateProvider>,
    ) -> Self {
        Self {
            provider,
            resolver: CrossRateResolver::new(account_currency, fallback),
        }
    }

    pub fn account_currency(&self) -> &str {
        self.resolver.account_currency()
    }

    /// Recompute all outputs from the current inputs. Pure over the
    /// inputs and the last applied cross rate; always returns a
    /// renderable result.
    pub fn recompute(&self, inputs: &SizerInputs) -> SizingResult {
        let instrument = Instrument::parse(&inputs.symbol);
        let ctx = self.resolver.context_for(&instrument, inputs.levels.entry);
        size_position(inputs, &instrument, &ctx)
    }

    /// Start a cross-rate lookup for the instrument, if it needs one.
    /// The returned tag must be passed back to `complete_lookup` with
    /// the provider's answer.
    pub fn begin_lookup(&mut self, instrument: &Instrument) -> Option<RateRequest> {
        if self.resolver.needs_lookup(instrument) {
            Some(self.resolver.begin_lookup(instrument))
        } else {
            None
        }
    }

    /// Feed a lookup response back in. Stale responses (a newer lookup
    /// was issued meanwhile) are discarded; failures leave the
    /// fallback rate in effect. Returns true when a fresh rate was
    /// applied and a recompute would now see it.
    pub fn complete_lookup(&mut self, request: &RateRequest, result: anyhow::Result<f64>) -> bool {
        self.resolver.apply(request, result)
    }

    /// Convenience for shells that can await: begin, fetch, complete.
    /// Returns true when the rate was applied.
    pub async fn refresh_rate(&mut self, symbol: &str) -> bool {
        let instrument = Instrument::parse(symbol);
        let Some(request) = self.begin_lookup(&instrument) else {
            return false;
        };
        let result = self.provider.fetch_rate(&request.from, &request.to).await;
        self.complete_lookup(&request, result)
    }
}
