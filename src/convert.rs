//! JPY-equivalent conversion of multi-currency balances
//!
//! # Example
//!
//! ```rust
//! use session_dashboard::convert::convert_to_jpy;
//! use session_dashboard::types::{BalanceSnapshot, RateSnapshot};
//!
//! let balances = BalanceSnapshot::from([("JPY".to_string(), 100.0), ("USD".to_string(), 10.0)]);
//! let rates = RateSnapshot::from([("USD/JPY".to_string(), 120.0)]);
//!
//! assert_eq!(convert_to_jpy(&balances, &rates), 1300.0);
//! ```

use crate::currency::Currency;
use crate::types::{Amount, BalanceSnapshot, RateSnapshot};

/// Total value of `balances` in yen, using the same day's `rates`.
///
/// A non-JPY currency contributes `amount * rate` when its code is present in
/// `balances` and its `<CUR>/JPY` key is present in `rates`. A zero amount is
/// present and contributes zero. A missing pair drops that currency from the
/// total. Codes outside the fixed set are ignored. Never fails and never rounds.
pub fn convert_to_jpy(balances: &BalanceSnapshot, rates: &RateSnapshot) -> Amount {
    let mut total = balances.get(Currency::JPY.code()).copied().unwrap_or(0.0);

    for currency in Currency::NON_JPY {
        let Some(amount) = balances.get(currency.code()) else {
            continue;
        };
        if let Some(rate) = rates.get(&currency.jpy_pair_key()) {
            total += amount * rate;
        }
    }

    total
}

/// Currencies in `balances` that had a non-zero amount but no `<CUR>/JPY` rate
pub fn unconverted_currencies(balances: &BalanceSnapshot, rates: &RateSnapshot) -> Vec<Currency> {
    Currency::NON_JPY
        .into_iter()
        .filter(|currency| {
            balances
                .get(currency.code())
                .is_some_and(|amount| *amount != 0.0)
                && !rates.contains_key(&currency.jpy_pair_key())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn balances(entries: &[(&str, f64)]) -> BalanceSnapshot {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn rates(entries: &[(&str, f64)]) -> RateSnapshot {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_zero_foreign_amounts_ignore_rates() {
        let b = balances(&[
            ("JPY", 1_000_000.0),
            ("USD", 0.0),
            ("EUR", 0.0),
            ("AUD", 0.0),
            ("HKD", 0.0),
        ]);

        assert_eq!(convert_to_jpy(&b, &RateSnapshot::new()), 1_000_000.0);
        let full = rates(&[
            ("USD/JPY", 120.0),
            ("EUR/JPY", 130.0),
            ("AUD/JPY", 85.0),
            ("HKD/JPY", 15.5),
        ]);
        assert_eq!(convert_to_jpy(&b, &full), 1_000_000.0);
    }

    #[test]
    fn test_usd_converted_with_rate() {
        let b = balances(&[("JPY", 100.0), ("USD", 10.0)]);
        let r = rates(&[("USD/JPY", 120.0)]);
        assert_eq!(convert_to_jpy(&b, &r), 1300.0);
    }

    #[test]
    fn test_missing_rate_drops_currency() {
        let b = balances(&[("JPY", 100.0), ("USD", 10.0)]);
        assert_eq!(convert_to_jpy(&b, &RateSnapshot::new()), 100.0);
        assert_eq!(unconverted_currencies(&b, &RateSnapshot::new()), vec![Currency::USD]);
    }

    #[test]
    fn test_missing_jpy_starts_from_zero() {
        let b = balances(&[("EUR", 2.0)]);
        let r = rates(&[("EUR/JPY", 130.0)]);
        assert_eq!(convert_to_jpy(&b, &r), 260.0);
    }

    #[test]
    fn test_unknown_currency_ignored() {
        let b = balances(&[("JPY", 50.0), ("GBP", 10.0)]);
        let r = rates(&[("GBP/JPY", 150.0)]);
        assert_eq!(convert_to_jpy(&b, &r), 50.0);
    }

    #[test]
    fn test_inverse_pairs_are_not_used() {
        let b = balances(&[("USD", 10.0)]);
        let r = rates(&[("JPY/USD", 0.0083)]);
        assert_eq!(convert_to_jpy(&b, &r), 0.0);
    }

    #[test]
    fn test_all_currencies_summed() {
        let b = balances(&[
            ("JPY", 998_000.0),
            ("USD", 8.30564784053156),
            ("AUD", 11.415525114155253),
            ("EUR", 0.0),
            ("HKD", 0.0),
        ]);
        let r = rates(&[
            ("USD/JPY", 119.27),
            ("EUR/JPY", 129.17),
            ("AUD/JPY", 85.71),
            ("HKD/JPY", 15.39),
        ]);

        let expected = 998_000.0 + 8.30564784053156 * 119.27 + 11.415525114155253 * 85.71;
        assert_relative_eq!(convert_to_jpy(&b, &r), expected, epsilon = 1e-9);
    }
}
