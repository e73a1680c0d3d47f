//! Currency codes and currency-pair keys used by session balances and scenario rates

use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed currency set a session can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
    /// Japanese Yen
    JPY,
    /// US Dollar
    USD,
    /// Euro
    EUR,
    /// Australian Dollar
    AUD,
    /// Hong Kong Dollar
    HKD,
}

impl Currency {
    /// Every supported currency, in balance-table column order
    pub const ALL: [Currency; 5] = [
        Currency::JPY,
        Currency::USD,
        Currency::EUR,
        Currency::AUD,
        Currency::HKD,
    ];

    /// Currencies that are folded into a JPY-equivalent total
    pub const NON_JPY: [Currency; 4] = [Currency::USD, Currency::EUR, Currency::AUD, Currency::HKD];

    /// Get ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::JPY => "JPY",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::AUD => "AUD",
            Currency::HKD => "HKD",
        }
    }

    /// Get currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::JPY => "¥",
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::AUD => "A$",
            Currency::HKD => "HK$",
        }
    }

    /// Parse from ISO code. Codes outside the fixed set yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "JPY" => Some(Currency::JPY),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "AUD" => Some(Currency::AUD),
            "HKD" => Some(Currency::HKD),
            _ => None,
        }
    }

    /// Pair key quoting this currency in yen, e.g. "USD/JPY"
    pub fn jpy_pair_key(&self) -> String {
        CurrencyPair::new(*self, Currency::JPY).to_string()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Currency pair for exchange rates
///
/// A rate for `BASE/QUOTE` is the number of QUOTE units per one BASE unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurrencyPair {
    pub base: Currency,
    pub quote: Currency,
}

impl CurrencyPair {
    /// Create new currency pair
    pub fn new(base: Currency, quote: Currency) -> Self {
        Self { base, quote }
    }

    /// Parse a "BASE/QUOTE" key, both sides drawn from the fixed currency set
    pub fn parse(key: &str) -> Result<Self> {
        let (base, quote) = key.split_once('/').ok_or_else(|| {
            DashboardError::InvalidData(format!("Invalid currency pair format: {}", key))
        })?;

        let lookup = |code: &str| {
            Currency::from_code(code).ok_or_else(|| {
                DashboardError::InvalidData(format!("Unknown currency in pair {}: {}", key, code))
            })
        };

        Ok(Self::new(lookup(base)?, lookup(quote)?))
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("USD"), Some(Currency::USD));
        assert_eq!(Currency::from_code("HKD"), Some(Currency::HKD));
        assert_eq!(Currency::from_code("GBP"), None);
    }

    #[test]
    fn test_currency_symbol() {
        assert_eq!(Currency::JPY.symbol(), "¥");
        assert_eq!(Currency::AUD.symbol(), "A$");
        assert_eq!(Currency::HKD.symbol(), "HK$");
    }

    #[test]
    fn test_jpy_pair_key() {
        assert_eq!(Currency::USD.jpy_pair_key(), "USD/JPY");
        assert_eq!(Currency::HKD.jpy_pair_key(), "HKD/JPY");
    }

    #[test]
    fn test_currency_pair_parse() {
        let pair = CurrencyPair::parse("EUR/JPY").unwrap();
        assert_eq!(pair.base, Currency::EUR);
        assert_eq!(pair.quote, Currency::JPY);
        assert_eq!(pair.to_string(), "EUR/JPY");
    }

    #[test]
    fn test_currency_pair_parse_rejects_malformed() {
        assert!(CurrencyPair::parse("EURJPY").is_err());
        assert!(CurrencyPair::parse("GBP/JPY").is_err());
        assert!(CurrencyPair::parse("USD/JPY/EUR").is_err());
    }
}
