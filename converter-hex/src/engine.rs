//! Rate-table conversion.
//!
//! Pure validation and multiplication. The rate table and the clock are both
//! injected, so the same input always yields the same outcome.

use converter_types::{
    AmountIssue, Clock, ConversionError, ConversionRequest, ConversionResult, SystemClock,
};
use rate_table::{Currency, RateTable, RateTableHandle};

use crate::amount::parse_amount;

/// Converts `request` against `table`.
///
/// Checks run in a fixed order and the first failure is reported:
/// amount format, amount sign, currency support, distinct currencies, stored rate.
/// An amount whose product with the rate leaves the positive finite range is
/// rejected as an invalid amount.
pub fn convert<C: Clock + ?Sized>(
    request: &ConversionRequest,
    table: &RateTable,
    clock: &C,
) -> Result<ConversionResult, ConversionError> {
    let amount = parse_amount(&request.amount_text).map_err(ConversionError::InvalidAmount)?;

    let source = supported_currency(&request.source, table)?;
    let target = supported_currency(&request.target, table)?;

    if source == target {
        return Err(ConversionError::IdenticalCurrencies(source));
    }

    let rate = table
        .lookup(source, target)
        .ok_or(ConversionError::NoRateAvailable {
            from: source,
            to: target,
        })?;

    let converted = amount * rate;
    if !converted.is_finite() {
        return Err(ConversionError::InvalidAmount(AmountIssue::NotFinite));
    }
    if converted <= 0.0 {
        return Err(ConversionError::InvalidAmount(AmountIssue::NotPositive));
    }

    Ok(ConversionResult::compute(
        amount,
        source,
        target,
        rate,
        clock.now(),
    ))
}

fn supported_currency(code: &str, table: &RateTable) -> Result<Currency, ConversionError> {
    code.parse::<Currency>()
        .ok()
        .filter(|c| table.supports(*c))
        .ok_or_else(|| ConversionError::UnsupportedCurrency(code.to_string()))
}

/// Conversion engine bound to a live rate table and a clock.
///
/// Each call converts against one table snapshot, so a concurrent
/// `RateTableHandle::replace` never yields a mixed result.
#[derive(Debug, Clone)]
pub struct ConversionEngine<C: Clock = SystemClock> {
    rates: RateTableHandle,
    clock: C,
}

impl ConversionEngine<SystemClock> {
    /// Creates an engine that timestamps with the wall clock.
    pub fn with_system_clock(rates: RateTableHandle) -> Self {
        Self::new(rates, SystemClock)
    }
}

impl<C: Clock> ConversionEngine<C> {
    pub fn new(rates: RateTableHandle, clock: C) -> Self {
        Self { rates, clock }
    }

    /// Returns the rate table handle.
    pub fn rates(&self) -> &RateTableHandle {
        &self.rates
    }

    #[tracing::instrument(skip(self), fields(source = %request.source, target = %request.target))]
    pub fn convert(
        &self,
        request: &ConversionRequest,
    ) -> Result<ConversionResult, ConversionError> {
        let table = self.rates.snapshot();
        let outcome = convert(request, &table, &self.clock);
        match &outcome {
            Ok(result) => tracing::debug!(
                rate = result.rate,
                converted = result.converted,
                "conversion computed"
            ),
            Err(e) => tracing::debug!(error = %e, "conversion rejected"),
        }
        outcome
    }
}
