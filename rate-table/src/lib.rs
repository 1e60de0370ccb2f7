//! Per-Direction Exchange Rate Tables
//!
//! This library provides the currency set and the immutable rate table used by
//! the conversion engine. Currencies are defined declaratively using a macro
//! that generates the `Currency` enum, its metadata and its text codec.
//!
//! A [`RateTable`] is a dense matrix indexed by currency ordinal. Each ordered
//! pair is either present with a strictly positive finite multiplier or absent.
//! Storage is per direction: `EUR -> USD` is never derived from `USD -> EUR`.
//!
//! # Adding a New Currency
//! Add a line to the `define_currencies!` invocation:
//! ```ignore
//! define_currencies! {
//!     // ... existing currencies ...
//!     CHF => ("CHF", "Fr", 2),
//! }
//! ```
//!
//! # Example
//! ```
//! use rate_table::{Currency, RateTable};
//!
//! let table = RateTable::default_table();
//! assert_eq!(table.lookup(Currency::USD, Currency::EUR), Some(0.92));
//! assert_eq!(table.lookup(Currency::USD, Currency::USD), None);
//! ```

use std::fmt;
use std::path::Path;

use serde::Deserialize;

mod handle;

pub use handle::RateTableHandle;

// ─────────────────────────────────────────────────────────────────────────────
// THE MACRO: Defines the Currency enum, its metadata and text codec
// ─────────────────────────────────────────────────────────────────────────────

/// Error returned when a currency code is not one of the known codes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown currency: {0}")]
pub struct UnknownCurrency(pub String);

/// Macro to define currencies with auto-generated enum, metadata and parsing.
///
/// # Syntax
/// ```ignore
/// define_currencies! {
///     Variant => ("CODE", "SYMBOL", display_decimals),
/// }
/// ```
#[macro_export]
macro_rules! define_currencies {
    (
        $(
            $name:ident => ($code:literal, $symbol:literal, $decimals:expr)
        ),* $(,)?
    ) => {
        /// Currencies known to the converter.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        pub enum Currency {
            $($name),*
        }

        impl Currency {
            /// Every known currency, in ordinal order.
            pub const ALL: &'static [Currency] = &[$(Currency::$name),*];

            /// Number of known currencies.
            pub const COUNT: usize = Currency::ALL.len();

            pub fn code(&self) -> &'static str {
                match self {
                    $(Currency::$name => $code),*
                }
            }

            pub fn symbol(&self) -> &'static str {
                match self {
                    $(Currency::$name => $symbol),*
                }
            }

            /// Decimal places customarily shown for this currency.
            pub fn decimals(&self) -> u8 {
                match self {
                    $(Currency::$name => $decimals),*
                }
            }

            /// Position of this currency in [`Currency::ALL`].
            pub fn ordinal(self) -> usize {
                self as usize
            }
        }

        impl std::fmt::Display for Currency {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.code())
            }
        }

        /// Parses a canonical code. No case folding or trimming is applied.
        impl std::str::FromStr for Currency {
            type Err = $crate::UnknownCurrency;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok(Currency::$name),)*
                    _ => Err($crate::UnknownCurrency(s.to_string())),
                }
            }
        }
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// CURRENCY DEFINITIONS - Add new currencies here!
// ─────────────────────────────────────────────────────────────────────────────

define_currencies! {
    USD => ("USD", "$", 2),
    EUR => ("EUR", "€", 2),
    PEN => ("PEN", "S/", 2),
    GBP => ("GBP", "£", 2),
    JPY => ("JPY", "¥", 0),
}

/// Rates shipped with the application.
pub const DEFAULT_RATES: &[(Currency, Currency, f64)] = &[
    (Currency::USD, Currency::EUR, 0.92),
    (Currency::EUR, Currency::USD, 1.09),
    (Currency::USD, Currency::PEN, 3.8),
    (Currency::PEN, Currency::USD, 0.26),
    (Currency::USD, Currency::GBP, 0.78),
    (Currency::GBP, Currency::USD, 1.28),
    (Currency::USD, Currency::JPY, 143.0),
    (Currency::JPY, Currency::USD, 0.007),
    (Currency::EUR, Currency::PEN, 4.13),
    (Currency::PEN, Currency::EUR, 0.24),
    (Currency::EUR, Currency::GBP, 0.85),
    (Currency::GBP, Currency::EUR, 1.18),
    (Currency::EUR, Currency::JPY, 155.0),
    (Currency::JPY, Currency::EUR, 0.0065),
    (Currency::GBP, Currency::PEN, 4.87),
    (Currency::PEN, Currency::GBP, 0.21),
    (Currency::GBP, Currency::JPY, 183.0),
    (Currency::JPY, Currency::GBP, 0.0055),
    (Currency::PEN, Currency::JPY, 37.6),
    (Currency::JPY, Currency::PEN, 0.027),
];

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised while constructing a rate table.
#[derive(Debug, thiserror::Error)]
pub enum RateTableError {
    #[error("Rate for {from} -> {to} must be positive and finite, got {rate}")]
    InvalidRate {
        from: Currency,
        to: Currency,
        rate: f64,
    },

    #[error("Identity pair {0} -> {0} cannot carry a rate")]
    IdentityPair(Currency),

    #[error("Duplicate rate for {from} -> {to}")]
    DuplicatePair { from: Currency, to: Currency },

    #[error("Rate references {0}, which is not in the currency list")]
    UnlistedCurrency(Currency),

    #[error(transparent)]
    UnknownCurrency(#[from] UnknownCurrency),

    #[error("Invalid rate table document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read rate table {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate Table
// ─────────────────────────────────────────────────────────────────────────────

type Matrix = [[Option<f64>; Currency::COUNT]; Currency::COUNT];

/// Immutable per-direction multiplier table.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    supported: [bool; Currency::COUNT],
    rates: Matrix,
}

impl RateTable {
    pub fn builder() -> RateTableBuilder {
        RateTableBuilder::default()
    }

    /// The table shipped with the application, covering every known currency.
    pub fn default_table() -> Self {
        let mut rates: Matrix = [[None; Currency::COUNT]; Currency::COUNT];
        for &(from, to, rate) in DEFAULT_RATES {
            rates[from.ordinal()][to.ordinal()] = Some(rate);
        }
        Self {
            supported: [true; Currency::COUNT],
            rates,
        }
    }

    /// Parses a JSON table document.
    ///
    /// ```json
    /// { "currencies": ["USD", "EUR"], "rates": [{ "from": "USD", "to": "EUR", "rate": 0.92 }] }
    /// ```
    ///
    /// When `currencies` is omitted the supported set is every currency named in `rates`.
    pub fn from_json_str(json: &str) -> Result<Self, RateTableError> {
        let doc: TableDocument = serde_json::from_str(json)?;

        let mut builder = RateTable::builder();
        for code in &doc.currencies {
            builder = builder.currency(code.parse()?);
        }
        for entry in &doc.rates {
            builder = builder.rate(entry.from.parse()?, entry.to.parse()?, entry.rate);
        }
        builder.build()
    }

    /// Reads and parses a JSON table document from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RateTableError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RateTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Returns the multiplier for `source -> target`, if the pair is stored.
    pub fn lookup(&self, source: Currency, target: Currency) -> Option<f64> {
        self.rates[source.ordinal()][target.ordinal()]
    }

    /// Whether `currency` belongs to this table's supported set.
    pub fn supports(&self, currency: Currency) -> bool {
        self.supported[currency.ordinal()]
    }

    /// Supported currencies in ordinal order.
    pub fn currencies(&self) -> impl Iterator<Item = Currency> + '_ {
        Currency::ALL.iter().copied().filter(|c| self.supports(*c))
    }

    /// Every stored pair with its multiplier.
    pub fn pairs(&self) -> impl Iterator<Item = (Currency, Currency, f64)> + '_ {
        Currency::ALL.iter().flat_map(move |&from| {
            Currency::ALL
                .iter()
                .filter_map(move |&to| self.lookup(from, to).map(|rate| (from, to, rate)))
        })
    }

    pub fn len(&self) -> usize {
        self.pairs().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reports pairs stored in both directions whose round trip strays from 1.0
    /// by more than `tolerance`. This is a data-quality check on the table
    /// contents; lookups never depend on it.
    pub fn inverse_inconsistencies(&self, tolerance: f64) -> Vec<InverseDeviation> {
        let mut deviations = Vec::new();
        for (i, &a) in Currency::ALL.iter().enumerate() {
            for &b in &Currency::ALL[i + 1..] {
                if let (Some(ab), Some(ba)) = (self.lookup(a, b), self.lookup(b, a)) {
                    let round_trip = ab * ba;
                    if (round_trip - 1.0).abs() > tolerance {
                        deviations.push(InverseDeviation { a, b, round_trip });
                    }
                }
            }
        }
        deviations
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::default_table()
    }
}

/// A pair whose stored rates are not inverses of each other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseDeviation {
    pub a: Currency,
    pub b: Currency,
    /// `lookup(a, b) * lookup(b, a)`
    pub round_trip: f64,
}

impl fmt::Display for InverseDeviation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} <-> {} round trip {:.4} ({:+.2}%)",
            self.a,
            self.b,
            self.round_trip,
            (self.round_trip - 1.0) * 100.0
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Validating builder for [`RateTable`].
#[derive(Debug, Default, Clone)]
pub struct RateTableBuilder {
    currencies: Vec<Currency>,
    rates: Vec<(Currency, Currency, f64)>,
}

impl RateTableBuilder {
    /// Adds a currency to the supported set.
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currencies.push(currency);
        self
    }

    /// Stores `rate` for `from -> to`.
    pub fn rate(mut self, from: Currency, to: Currency, rate: f64) -> Self {
        self.rates.push((from, to, rate));
        self
    }

    pub fn build(self) -> Result<RateTable, RateTableError> {
        let explicit = !self.currencies.is_empty();
        let mut supported = [false; Currency::COUNT];
        for c in &self.currencies {
            supported[c.ordinal()] = true;
        }

        let mut rates: Matrix = [[None; Currency::COUNT]; Currency::COUNT];
        for (from, to, rate) in self.rates {
            if from == to {
                return Err(RateTableError::IdentityPair(from));
            }
            if !rate.is_finite() || rate <= 0.0 {
                return Err(RateTableError::InvalidRate { from, to, rate });
            }
            for c in [from, to] {
                if !supported[c.ordinal()] {
                    if explicit {
                        return Err(RateTableError::UnlistedCurrency(c));
                    }
                    supported[c.ordinal()] = true;
                }
            }
            let slot = &mut rates[from.ordinal()][to.ordinal()];
            if slot.is_some() {
                return Err(RateTableError::DuplicatePair { from, to });
            }
            *slot = Some(rate);
        }

        Ok(RateTable { supported, rates })
    }
}

#[derive(Debug, Deserialize)]
struct TableDocument {
    #[serde(default)]
    currencies: Vec<String>,
    rates: Vec<RateEntry>,
}

#[derive(Debug, Deserialize)]
struct RateEntry {
    from: String,
    to: String,
    rate: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_code_parse() {
        assert_eq!("USD".parse::<Currency>().unwrap(), Currency::USD);
        assert_eq!("PEN".parse::<Currency>().unwrap(), Currency::PEN);
    }

    #[test]
    fn test_currency_parse_is_exact() {
        assert!("usd".parse::<Currency>().is_err());
        assert!(" USD".parse::<Currency>().is_err());
        assert_eq!(
            "XXX".parse::<Currency>(),
            Err(UnknownCurrency("XXX".to_string()))
        );
    }

    #[test]
    fn test_currency_code_display() {
        assert_eq!(Currency::JPY.to_string(), "JPY");
        assert_eq!(Currency::ALL.len(), 5);
        assert_eq!(Currency::COUNT, 5);
    }

    #[test]
    fn test_default_table_lookup() {
        let table = RateTable::default_table();
        assert_eq!(table.lookup(Currency::USD, Currency::EUR), Some(0.92));
        assert_eq!(table.lookup(Currency::JPY, Currency::PEN), Some(0.027));
        assert_eq!(table.len(), 20);
    }

    #[test]
    fn test_identity_pairs_absent() {
        let table = RateTable::default_table();
        for &c in Currency::ALL {
            assert_eq!(table.lookup(c, c), None);
        }
    }

    #[test]
    fn test_default_table_passes_validation() {
        let mut builder = RateTable::builder();
        for &(from, to, rate) in DEFAULT_RATES {
            builder = builder.rate(from, to, rate);
        }
        assert_eq!(builder.build().unwrap(), RateTable::default_table());
    }

    #[test]
    fn test_default_table_inverses_within_five_percent() {
        let table = RateTable::default_table();
        assert!(table.inverse_inconsistencies(0.05).is_empty());
    }

    #[test]
    fn test_inverse_check_flags_skewed_pair() {
        let table = RateTable::builder()
            .rate(Currency::USD, Currency::EUR, 0.92)
            .rate(Currency::EUR, Currency::USD, 1.5)
            .build()
            .unwrap();
        let deviations = table.inverse_inconsistencies(0.05);
        assert_eq!(deviations.len(), 1);
        assert_eq!(deviations[0].a, Currency::USD);
        assert_eq!(deviations[0].b, Currency::EUR);
    }

    #[test]
    fn test_builder_rejects_bad_rates() {
        let result = RateTable::builder()
            .rate(Currency::USD, Currency::EUR, 0.0)
            .build();
        assert!(matches!(result, Err(RateTableError::InvalidRate { .. })));

        let result = RateTable::builder()
            .rate(Currency::USD, Currency::EUR, f64::NAN)
            .build();
        assert!(matches!(result, Err(RateTableError::InvalidRate { .. })));

        let result = RateTable::builder()
            .rate(Currency::USD, Currency::USD, 1.0)
            .build();
        assert!(matches!(
            result,
            Err(RateTableError::IdentityPair(Currency::USD))
        ));

        let result = RateTable::builder()
            .rate(Currency::USD, Currency::EUR, 0.9)
            .rate(Currency::USD, Currency::EUR, 0.91)
            .build();
        assert!(matches!(result, Err(RateTableError::DuplicatePair { .. })));
    }

    #[test]
    fn test_builder_supported_set() {
        let table = RateTable::builder()
            .rate(Currency::USD, Currency::EUR, 0.92)
            .build()
            .unwrap();
        assert!(table.supports(Currency::USD));
        assert!(table.supports(Currency::EUR));
        assert!(!table.supports(Currency::JPY));

        let result = RateTable::builder()
            .currency(Currency::USD)
            .rate(Currency::USD, Currency::EUR, 0.92)
            .build();
        assert!(matches!(
            result,
            Err(RateTableError::UnlistedCurrency(Currency::EUR))
        ));
    }

    #[test]
    fn test_pairs_are_per_direction() {
        let table = RateTable::builder()
            .rate(Currency::GBP, Currency::PEN, 4.87)
            .build()
            .unwrap();
        assert_eq!(table.lookup(Currency::GBP, Currency::PEN), Some(4.87));
        assert_eq!(table.lookup(Currency::PEN, Currency::GBP), None);
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"{
            "currencies": ["USD", "EUR", "JPY"],
            "rates": [
                { "from": "USD", "to": "EUR", "rate": 0.92 },
                { "from": "EUR", "to": "USD", "rate": 1.09 }
            ]
        }"#;
        let table = RateTable::from_json_str(json).unwrap();
        assert_eq!(table.lookup(Currency::EUR, Currency::USD), Some(1.09));
        assert!(table.supports(Currency::JPY));
        assert!(!table.supports(Currency::GBP));
        assert_eq!(
            table.currencies().collect::<Vec<_>>(),
            vec![Currency::USD, Currency::EUR, Currency::JPY]
        );
    }

    #[test]
    fn test_from_json_str_errors() {
        let json = r#"{ "rates": [{ "from": "USD", "to": "XXX", "rate": 1.0 }] }"#;
        assert!(matches!(
            RateTable::from_json_str(json),
            Err(RateTableError::UnknownCurrency(_))
        ));

        assert!(matches!(
            RateTable::from_json_str("not json"),
            Err(RateTableError::Parse(_))
        ));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.json");
        std::fs::write(
            &path,
            r#"{ "rates": [{ "from": "PEN", "to": "USD", "rate": 0.26 }] }"#,
        )
        .unwrap();

        let table = RateTable::from_json_file(&path).unwrap();
        assert_eq!(table.lookup(Currency::PEN, Currency::USD), Some(0.26));

        let missing = RateTable::from_json_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(RateTableError::Io { .. })));
    }
}
