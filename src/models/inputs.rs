use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

/// How the risk budget is expressed. Always resolved to an absolute
/// account-currency amount before any sizing math runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "value")]
pub enum RiskSpec {
    Amount(f64),
    PercentOfEquity(f64),
}

impl RiskSpec {
    pub fn resolve(&self, equity: f64) -> f64 {
        let amount = match self {
            RiskSpec::Amount(a) => *a,
            RiskSpec::PercentOfEquity(pct) => equity * pct / 100.0,
        };
        amount.max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Limit,
    Market,
}

impl ExecutionMode {
    pub fn description(&self) -> &'static str {
        match self {
            ExecutionMode::Limit => "limit order, exact planned size",
            ExecutionMode::Market => "market order, 5% size buffer for slippage",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Limit => write!(f, "limit"),
            ExecutionMode::Market => write!(f, "market"),
        }
    }
}

/// Which monetary figure the result panel leads with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Risk,
    Gain,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevels {
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: Option<f64>,
}

impl PriceLevels {
    pub fn new(entry: f64, stop_loss: f64) -> Self {
        Self {
            entry,
            stop_loss,
            take_profit: None,
        }
    }

    pub fn with_take_profit(mut self, tp: f64) -> Self {
        self.take_profit = Some(tp);
        self
    }
}

/// Everything the engine needs for one recomputation. The shell
/// rebuilds this from raw field values on every input change; empty or
/// unparseable fields arrive as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizerInputs {
    pub equity: f64,
    /// Reference account size for the equity-delta readout.
    pub reference_equity: Option<f64>,
    pub risk: RiskSpec,
    pub symbol: String,
    pub levels: PriceLevels,
    pub execution: ExecutionMode,
    pub display: DisplayMode,
}
