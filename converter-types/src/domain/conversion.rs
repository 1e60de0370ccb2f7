//! Conversion request and result.

use chrono::{DateTime, Utc};
use rate_table::Currency;
use serde::{Deserialize, Serialize};

/// Raw conversion input as typed by the user.
///
/// Nothing here is trusted: the engine validates every field on submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    /// Amount text, e.g. `"100"` or `"12.50"`
    pub amount_text: String,
    /// Source currency code, e.g. `"USD"`
    pub source: String,
    /// Target currency code, e.g. `"EUR"`
    pub target: String,
}

impl ConversionRequest {
    pub fn new(
        amount_text: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            amount_text: amount_text.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}

/// A completed conversion.
///
/// Results are immutable once produced. `converted` is stored at full
/// precision; rounding happens only in [`ConversionResult::display_line`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Validated input amount, strictly positive
    pub amount: f64,
    pub source: Currency,
    pub target: Currency,
    /// Multiplier applied for `source -> target`
    pub rate: f64,
    /// `amount * rate`
    pub converted: f64,
    /// When the conversion was computed, per the injected clock
    pub computed_at: DateTime<Utc>,
}

impl ConversionResult {
    /// Builds a result from validated parts.
    pub fn compute(
        amount: f64,
        source: Currency,
        target: Currency,
        rate: f64,
        computed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            amount,
            source,
            target,
            rate,
            converted: amount * rate,
            computed_at,
        }
    }

    /// One-line summary for display, e.g. `100 USD = 92.00 EUR`.
    pub fn display_line(&self) -> String {
        format!(
            "{} {} = {:.2} {}",
            self.amount, self.source, self.converted, self.target
        )
    }
}
