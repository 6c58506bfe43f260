use serde::{Deserialize, Serialize};
use std::fmt;

/// Instrument classification, in priority order: a symbol containing
/// "JPY" is always treated as JPY-quoted even if it also matches a
/// later rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentClass {
    JpyQuote,
    Gold,
    Silver,
    Crypto,
    Fx,
}

impl fmt::Display for InstrumentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstrumentClass::JpyQuote => write!(f, "jpy_quote"),
            InstrumentClass::Gold => write!(f, "gold"),
            InstrumentClass::Silver => write!(f, "silver"),
            InstrumentClass::Crypto => write!(f, "crypto"),
            InstrumentClass::Fx => write!(f, "fx"),
        }
    }
}

/// A parsed instrument symbol plus the quoting conventions derived
/// from it. Unknown symbols are not an error: they fall through to
/// standard FX conventions (0.0001 pip, 100k contract).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub class: InstrumentClass,
}

impl Instrument {
    /// Accepts "EUR/USD", "eurusd", "EUR-USD" — anything non-alphabetic
    /// is stripped before matching.
    pub fn parse(raw: &str) -> Self {
        let symbol: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        let class = if symbol.contains("JPY") {
            InstrumentClass::JpyQuote
        } else if symbol.contains("XAU") {
            InstrumentClass::Gold
        } else if symbol.contains("XAG") {
            InstrumentClass::Silver
        } else if symbol.contains("BTC") || symbol.contains("ETH") {
            InstrumentClass::Crypto
        } else {
            InstrumentClass::Fx
        };

        Self { symbol, class }
    }

    /// Smallest price increment counted as one pip/point.
    pub fn pip_size(&self) -> f64 {
        match self.class {
            InstrumentClass::Fx => 0.0001,
            // JPY pairs, metals and crypto all quote in hundredths.
            _ => 0.01,
        }
    }

    /// Multiplier converting a raw price difference into a point count.
    /// Always the reciprocal of `pip_size`.
    pub fn scalar(&self) -> f64 {
        1.0 / self.pip_size()
    }

    /// Units of the base asset per standard lot.
    pub fn contract_size(&self) -> f64 {
        match self.class {
            InstrumentClass::Gold => 100.0,
            InstrumentClass::Silver => 5000.0,
            InstrumentClass::Crypto => 1.0,
            InstrumentClass::Fx | InstrumentClass::JpyQuote => 100_000.0,
        }
    }

    /// Stop distances below this many points are flagged as unsafe for
    /// market execution.
    pub fn warning_threshold_points(&self) -> f64 {
        match self.class {
            InstrumentClass::JpyQuote => 5.0,
            InstrumentClass::Gold | InstrumentClass::Silver => 50.0,
            _ => 3.0,
        }
    }

    /// Decimal places a shell should use when formatting prices for
    /// this instrument (3 for JPY/metal/crypto, 5 otherwise).
    pub fn display_decimals(&self) -> usize {
        match self.class {
            InstrumentClass::Fx => 5,
            _ => 3,
        }
    }

    /// First part of the symbol, everything before the quote currency.
    /// For short or odd symbols the 3/3 split is an approximation,
    /// same as the quoting defaults.
    pub fn base_currency(&self) -> &str {
        let n = self.symbol.len().saturating_sub(3);
        &self.symbol[..n]
    }

    /// Last three letters of the symbol.
    pub fn quote_currency(&self) -> &str {
        let n = self.symbol.len().saturating_sub(3);
        &self.symbol[n..]
    }

    pub fn is_quoted_in(&self, currency: &str) -> bool {
        self.symbol.ends_with(currency)
    }

    pub fn is_based_in(&self, currency: &str) -> bool {
        self.symbol.starts_with(currency)
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}
