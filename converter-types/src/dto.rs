//! Data Transfer Objects (DTOs) for presentation output.

use rate_table::{Currency, RateTable};
use serde::{Deserialize, Serialize};

/// One stored direction of the rate table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateRow {
    pub from: Currency,
    pub to: Currency,
    pub rate: f64,
}

impl RateRow {
    /// Rows for every stored pair, optionally restricted to one source currency.
    pub fn from_table(table: &RateTable, base: Option<Currency>) -> Vec<RateRow> {
        table
            .pairs()
            .filter(|(from, _, _)| base.is_none_or(|b| b == *from))
            .map(|(from, to, rate)| RateRow { from, to, rate })
            .collect()
    }
}

/// A supported currency and its display metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyInfo {
    pub code: Currency,
    pub symbol: String,
    pub decimals: u8,
}

impl From<Currency> for CurrencyInfo {
    fn from(code: Currency) -> Self {
        Self {
            code,
            symbol: code.symbol().to_string(),
            decimals: code.decimals(),
        }
    }
}
