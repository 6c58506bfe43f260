/// Symbols offered for autocomplete. Static; unknown symbols typed
/// past the catalog still size with default FX conventions.
pub const ALL_PAIRS: &[&str] = &[
    "EUR/USD", "GBP/USD", "USD/JPY", "USD/CHF", "AUD/USD", "USD/CAD", "NZD/USD",
    "EUR/GBP", "EUR/JPY", "GBP/JPY", "AUD/JPY", "CHF/JPY", "EUR/CHF", "GBP/CHF",
    "EUR/CAD", "EUR/AUD", "EUR/NZD", "GBP/CAD", "GBP/AUD", "GBP/NZD", "AUD/CAD",
    "AUD/NZD", "NZD/CAD", "NZD/JPY", "CAD/JPY", "AUD/CHF", "CAD/CHF", "NZD/CHF",
    "USD/TRY", "USD/MXN", "USD/ZAR", "USD/SGD", "USD/HKD", "USD/SEK", "USD/DKK",
    "USD/NOK", "XAU/USD", "XAG/USD", "BTC/USD", "ETH/USD",
];

pub struct InstrumentCatalog {
    pairs: &'static [&'static str],
}

impl InstrumentCatalog {
    pub fn new() -> Self {
        Self { pairs: ALL_PAIRS }
    }

    /// Case-insensitive substring match, separator-agnostic. Empty
    /// fragments suggest nothing, matching the autocomplete behavior
    /// of only opening once the user types.
    pub fn suggest(&self, fragment: &str) -> Vec<&'static str> {
        let needle = normalize(fragment);
        if needle.is_empty() {
            return Vec::new();
        }
        self.pairs
            .iter()
            .copied()
            .filter(|p| normalize(p).contains(&needle))
            .collect()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        let needle = normalize(symbol);
        self.pairs.iter().any(|p| normalize(p) == needle)
    }

    pub fn all(&self) -> &'static [&'static str] {
        self.pairs
    }
}

impl Default for InstrumentCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}
