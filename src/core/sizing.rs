use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::pips::pip_distance;
use crate::models::{DisplayMode, ExecutionMode, Instrument, SizerInputs};

/// Fraction of the planned size kept when sizing for market execution,
/// to absorb spread and slippage.
const MARKET_HAIRCUT: f64 = 0.95;

/// Shown whenever a required input is missing and no size can be
/// derived yet.
pub const WAITING_MESSAGE: &str = "waiting for input";

/// Quote-currency conversion inputs for one recomputation. Built by
/// the caller (see `CrossRateResolver`), never held as module state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionContext<'a> {
    pub account_currency: &'a str,
    /// Quote → account rate. 1.0 when the pair already quotes in the
    /// account currency, or as the documented fallback approximation.
    pub quote_to_account_rate: f64,
}

impl<'a> ConversionContext<'a> {
    /// Context for a directly-quoted pair (or the flat fallback).
    pub fn direct(account_currency: &'a str) -> Self {
        Self {
            account_currency,
            quote_to_account_rate: 1.0,
        }
    }

    pub fn with_rate(account_currency: &'a str, rate: f64) -> Self {
        Self {
            account_currency,
            quote_to_account_rate: rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingResult {
    pub distance_points: f64,
    /// Account-currency value of a one-point move for one lot.
    pub value_per_point_per_lot: f64,
    /// Floored to two decimals; never rounds up.
    pub lot_size: f64,
    /// Lots expressed in base-asset units.
    pub units: f64,
    /// Resolved absolute risk budget in account currency.
    pub risk_amount: f64,
    /// Risk or potential gain, depending on the display mode.
    pub displayed_amount: f64,
    pub potential_gain: Option<f64>,
    pub risk_reward: Option<f64>,
    pub equity_delta_pct: Option<f64>,
    pub advisory: Option<String>,
    pub execution_note: String,
}

impl SizingResult {
    /// The defined "no result" state: everything zero, never an error.
    fn waiting(inputs: &SizerInputs, risk_amount: f64, equity_delta_pct: Option<f64>) -> Self {
        Self {
            distance_points: 0.0,
            value_per_point_per_lot: 0.0,
            lot_size: 0.0,
            units: 0.0,
            risk_amount,
            displayed_amount: risk_amount,
            potential_gain: None,
            risk_reward: None,
            equity_delta_pct,
            advisory: Some(WAITING_MESSAGE.to_string()),
            execution_note: inputs.execution.description().to_string(),
        }
    }
}

/// Compute position size and auxiliary figures for one set of inputs.
///
/// Pure over its arguments: classification comes from `instrument`,
/// currency conversion from `ctx`, and nothing is cached here. Any
/// missing or zero required input yields the zero result rather than
/// an error or a division fault.
pub fn size_position(
    inputs: &SizerInputs,
    instrument: &Instrument,
    ctx: &ConversionContext<'_>,
) -> SizingResult {
    let risk_amount = inputs.risk.resolve(inputs.equity);
    let entry = inputs.levels.entry;
    let stop = inputs.levels.stop_loss;

    let equity_delta_pct = inputs
        .reference_equity
        .filter(|r| *r > 0.0)
        .map(|r| (inputs.equity - r) / r * 100.0);

    if inputs.equity <= 0.0 || entry <= 0.0 || stop <= 0.0 || risk_amount <= 0.0 {
        return SizingResult::waiting(inputs, risk_amount, equity_delta_pct);
    }

    let distance_points = pip_distance(instrument, entry, stop);
    if distance_points == 0.0 {
        return SizingResult::waiting(inputs, risk_amount, equity_delta_pct);
    }

    let vppl = value_per_point_per_lot(instrument, entry, ctx);

    let denominator = distance_points * vppl;
    let limit_lots = if denominator > 0.0 {
        floor2(risk_amount / denominator)
    } else {
        0.0
    };

    let lot_size = match inputs.execution {
        ExecutionMode::Limit => limit_lots,
        // Haircut on the already-rounded planning size, floored again:
        // overshooting size overshoots risk.
        ExecutionMode::Market => floor2(limit_lots * MARKET_HAIRCUT),
    };

    let tp_points = inputs
        .levels
        .take_profit
        .filter(|tp| *tp > 0.0)
        .map(|tp| pip_distance(instrument, entry, tp));

    let risk_reward = tp_points
        .filter(|p| *p > 0.0)
        .map(|p| p / distance_points);

    let potential_gain = tp_points.map(|p| lot_size * p * vppl);

    let displayed_amount = match (inputs.display, potential_gain) {
        (DisplayMode::Gain, Some(gain)) => gain,
        _ => risk_amount,
    };

    let advisory = if inputs.execution == ExecutionMode::Market
        && distance_points < instrument.warning_threshold_points()
    {
        Some(format!(
            "stop distance {:.1} points is below the {:.0}-point minimum considered safe for market execution on {}",
            distance_points,
            instrument.warning_threshold_points(),
            instrument.symbol,
        ))
    } else {
        None
    };

    debug!(
        symbol = %instrument.symbol,
        distance_points,
        vppl,
        lot_size,
        "sized position"
    );

    SizingResult {
        distance_points,
        value_per_point_per_lot: vppl,
        lot_size,
        units: lot_size * instrument.contract_size(),
        risk_amount,
        displayed_amount,
        potential_gain,
        risk_reward,
        equity_delta_pct,
        advisory,
        execution_note: inputs.execution.description().to_string(),
    }
}

/// Account-currency value of one point for one lot.
///
/// Direct quote (pair ends in the account currency): contract/scalar.
/// Inverse quote (pair starts with it): divide by the entry price.
/// Cross pair: multiply by the quote→account rate from the context.
pub fn value_per_point_per_lot(
    instrument: &Instrument,
    entry: f64,
    ctx: &ConversionContext<'_>,
) -> f64 {
    let per_point = instrument.contract_size() / instrument.scalar();

    if instrument.is_quoted_in(ctx.account_currency) {
        per_point
    } else if instrument.is_based_in(ctx.account_currency) {
        if entry > 0.0 {
            per_point / entry
        } else {
            0.0
        }
    } else {
        per_point * ctx.quote_to_account_rate
    }
}

/// Truncate to two decimals, never rounding up. The epsilon absorbs
/// float noise so an exact 0.60 does not land on 0.59.
fn floor2(x: f64) -> f64 {
    (x * 100.0 + 1e-9).floor() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PriceLevels, RiskSpec};

    fn usd_inputs(
        equity: f64,
        risk: RiskSpec,
        symbol: &str,
        levels: PriceLevels,
    ) -> SizerInputs {
        SizerInputs {
            equity,
            reference_equity: None,
            risk,
            symbol: symbol.to_string(),
            levels,
            execution: ExecutionMode::Limit,
            display: DisplayMode::Risk,
        }
    }

    fn size(inputs: &SizerInputs) -> SizingResult {
        let instrument = Instrument::parse(&inputs.symbol);
        size_position(inputs, &instrument, &ConversionContext::direct("USD"))
    }

    #[test]
    fn eurusd_reference_scenario() {
        // 10k equity, 1% risk, 50 pip stop => 0.20 lots at $10/pip.
        let inputs = usd_inputs(
            10_000.0,
            RiskSpec::PercentOfEquity(1.0),
            "EUR/USD",
            PriceLevels::new(1.1050, 1.1000),
        );
        let r = size(&inputs);
        assert!((r.risk_amount - 100.0).abs() < 1e-9);
        assert!((r.distance_points - 50.0).abs() < 1e-6);
        assert!((r.value_per_point_per_lot - 10.0).abs() < 1e-9);
        assert!((r.lot_size - 0.20).abs() < 1e-9);
        assert!((r.units - 20_000.0).abs() < 1e-6);
    }

    #[test]
    fn usdjpy_inverse_quote_scenario() {
        // $200 risk, 50 point stop, vppl = 1000/150 => 0.60 lots.
        let inputs = usd_inputs(
            10_000.0,
            RiskSpec::Amount(200.0),
            "USD/JPY",
            PriceLevels::new(150.00, 149.50),
        );
        let r = size(&inputs);
        assert!((r.distance_points - 50.0).abs() < 1e-6);
        assert!((r.value_per_point_per_lot - 1000.0 / 150.0).abs() < 1e-9);
        assert!((r.lot_size - 0.60).abs() < 1e-9);
    }

    #[test]
    fn cross_pair_uses_conversion_rate() {
        // EUR/GBP with a USD account: vppl = 10 * rate.
        let inputs = usd_inputs(
            10_000.0,
            RiskSpec::Amount(100.0),
            "EUR/GBP",
            PriceLevels::new(0.8550, 0.8500),
        );
        let instrument = Instrument::parse(&inputs.symbol);
        let ctx = ConversionContext::with_rate("USD", 1.25);
        let r = size_position(&inputs, &instrument, &ctx);
        assert!((r.value_per_point_per_lot - 12.5).abs() < 1e-9);
        assert!((r.lot_size - 0.16).abs() < 1e-9);
    }

    #[test]
    fn cross_pair_fallback_rate_of_one() {
        let inputs = usd_inputs(
            10_000.0,
            RiskSpec::Amount(100.0),
            "EUR/GBP",
            PriceLevels::new(0.8550, 0.8500),
        );
        let r = size(&inputs);
        // Flat approximation: $10/point as if directly quoted.
        assert!((r.value_per_point_per_lot - 10.0).abs() < 1e-9);
        assert!((r.lot_size - 0.20).abs() < 1e-9);
    }

    #[test]
    fn floor_never_rounds_up() {
        // risk / (distance * vppl) = 123.99 / (10 * 10) = 1.2399,
        // which must truncate to 1.23, never round to 1.24.
        let inputs = usd_inputs(
            10_000.0,
            RiskSpec::Amount(123.99),
            "EURUSD",
            PriceLevels::new(1.2010, 1.2000),
        );
        let r = size(&inputs);
        assert!((r.lot_size - 1.23).abs() < 1e-9);
    }

    #[test]
    fn market_mode_applies_haircut_to_limit_size() {
        let levels = PriceLevels::new(1.1050, 1.1000);
        let limit = size(&usd_inputs(
            10_000.0,
            RiskSpec::Amount(100.0),
            "EURUSD",
            levels,
        ));
        let mut market_inputs =
            usd_inputs(10_000.0, RiskSpec::Amount(100.0), "EURUSD", levels);
        market_inputs.execution = ExecutionMode::Market;
        let market = size(&market_inputs);
        let expected = ((limit.lot_size * MARKET_HAIRCUT) * 100.0 + 1e-9).floor() / 100.0;
        assert!((market.lot_size - expected).abs() < 1e-9);
        assert!(market.lot_size < limit.lot_size);
    }

    #[test]
    fn zero_equity_yields_waiting_state() {
        let inputs = usd_inputs(
            0.0,
            RiskSpec::Amount(100.0),
            "EURUSD",
            PriceLevels::new(1.1050, 1.1000),
        );
        let r = size(&inputs);
        assert_eq!(r.lot_size, 0.0);
        assert_eq!(r.units, 0.0);
        assert_eq!(r.advisory.as_deref(), Some(WAITING_MESSAGE));
    }

    #[test]
    fn zero_distance_yields_waiting_state() {
        let inputs = usd_inputs(
            10_000.0,
            RiskSpec::Amount(100.0),
            "EURUSD",
            PriceLevels::new(1.1050, 1.1050),
        );
        let r = size(&inputs);
        assert_eq!(r.lot_size, 0.0);
        assert_eq!(r.distance_points, 0.0);
    }

    #[test]
    fn missing_stop_yields_waiting_state() {
        let inputs = usd_inputs(
            10_000.0,
            RiskSpec::PercentOfEquity(2.0),
            "EURUSD",
            PriceLevels::new(1.1050, 0.0),
        );
        let r = size(&inputs);
        assert_eq!(r.lot_size, 0.0);
        // Risk budget is still resolved and displayable.
        assert!((r.risk_amount - 200.0).abs() < 1e-9);
    }

    #[test]
    fn lots_monotone_in_distance_and_risk() {
        let base = usd_inputs(
            10_000.0,
            RiskSpec::Amount(100.0),
            "EURUSD",
            PriceLevels::new(1.1050, 1.1000),
        );
        let mut prev = f64::INFINITY;
        for pips in [10.0, 25.0, 50.0, 100.0, 200.0] {
            let mut inputs = base.clone();
            inputs.levels.stop_loss = 1.1050 - pips * 0.0001;
            let lots = size(&inputs).lot_size;
            assert!(lots <= prev, "lots must not grow with distance");
            prev = lots;
        }

        let mut prev = 0.0;
        for risk in [50.0, 100.0, 200.0, 400.0] {
            let mut inputs = base.clone();
            inputs.risk = RiskSpec::Amount(risk);
            let lots = size(&inputs).lot_size;
            assert!(lots >= prev, "lots must not shrink with risk budget");
            prev = lots;
        }
    }

    #[test]
    fn gain_mode_reports_take_profit_value() {
        let levels = PriceLevels::new(1.1050, 1.1000).with_take_profit(1.1150);
        let mut inputs = usd_inputs(10_000.0, RiskSpec::Amount(100.0), "EURUSD", levels);
        inputs.display = DisplayMode::Gain;
        let r = size(&inputs);
        // 0.20 lots * 100 pips * $10 = $200, 2:1 reward.
        assert!((r.potential_gain.unwrap() - 200.0).abs() < 1e-6);
        assert!((r.displayed_amount - 200.0).abs() < 1e-6);
        assert!((r.risk_reward.unwrap() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn risk_mode_reports_risk_even_with_take_profit() {
        let levels = PriceLevels::new(1.1050, 1.1000).with_take_profit(1.1150);
        let inputs = usd_inputs(10_000.0, RiskSpec::Amount(100.0), "EURUSD", levels);
        let r = size(&inputs);
        assert!((r.displayed_amount - 100.0).abs() < 1e-9);
        assert!(r.risk_reward.is_some());
    }

    #[test]
    fn no_take_profit_means_no_ratio() {
        let inputs = usd_inputs(
            10_000.0,
            RiskSpec::Amount(100.0),
            "EURUSD",
            PriceLevels::new(1.1050, 1.1000),
        );
        let r = size(&inputs);
        assert!(r.risk_reward.is_none());
        assert!(r.potential_gain.is_none());
    }

    #[test]
    fn market_mode_flags_tight_stop() {
        // 2 pips on EURUSD, below the 3-point FX threshold.
        let mut inputs = usd_inputs(
            10_000.0,
            RiskSpec::Amount(100.0),
            "EURUSD",
            PriceLevels::new(1.10520, 1.10500),
        );
        inputs.execution = ExecutionMode::Market;
        let r = size(&inputs);
        let advisory = r.advisory.expect("tight market stop should warn");
        assert!(advisory.contains("market execution"));

        // Same distance in limit mode: no warning.
        let mut limit = inputs.clone();
        limit.execution = ExecutionMode::Limit;
        assert!(size(&limit).advisory.is_none());
    }

    #[test]
    fn gold_uses_metal_threshold() {
        // 30 points on gold is under the 50-point metal threshold.
        let mut inputs = usd_inputs(
            10_000.0,
            RiskSpec::Amount(100.0),
            "XAU/USD",
            PriceLevels::new(2400.00, 2399.70),
        );
        inputs.execution = ExecutionMode::Market;
        let r = size(&inputs);
        assert!(r.advisory.is_some());
        // Gold vppl: 100 units / scalar 100 = $1/point.
        assert!((r.value_per_point_per_lot - 1.0).abs() < 1e-9);
    }

    #[test]
    fn equity_delta_against_reference() {
        let mut inputs = usd_inputs(
            11_000.0,
            RiskSpec::Amount(100.0),
            "EURUSD",
            PriceLevels::new(1.1050, 1.1000),
        );
        inputs.reference_equity = Some(10_000.0);
        let r = size(&inputs);
        assert!((r.equity_delta_pct.unwrap() - 10.0).abs() < 1e-9);
    }
}
