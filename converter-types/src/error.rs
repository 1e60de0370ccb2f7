//! Error types for the currency converter.

use rate_table::Currency;

/// Why an amount was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AmountIssue {
    #[error("amount is empty")]
    Empty,

    #[error("amount may only contain digits and one decimal point")]
    Malformed,

    #[error("amount is too large")]
    NotFinite,

    #[error("amount must be greater than zero")]
    NotPositive,
}

/// Input validation failures from the conversion engine.
///
/// These are expected user-input conditions, deterministic for a given input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(AmountIssue),

    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Select two different currencies (both are {0})")]
    IdenticalCurrencies(Currency),

    #[error("No rate available for {from} -> {to}")]
    NoRateAvailable { from: Currency, to: Currency },
}

/// Document store failures (reported by store adapters).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Network or availability problem; the same write may succeed later.
    #[error("Store unavailable: {0}")]
    Transient(String),

    /// The store refused the document; retrying will not help.
    #[error("Store rejected document: {0}")]
    Permanent(String),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}

/// Conversion recording failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("User not authenticated")]
    NotAuthenticated,

    #[error("Failed to save conversion after {attempts} attempt(s): {reason}")]
    PersistenceFailure { attempts: u32, reason: String },
}

/// Identity provider failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Application-level errors surfaced to the presentation layer.
///
/// Each variant keeps the discriminated cause so callers can show a
/// specific message per kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl AppError {
    /// Whether the user can fix this by changing their input.
    pub fn is_user_correctable(&self) -> bool {
        match self {
            AppError::Conversion(_) => true,
            AppError::Auth(AuthError::Unavailable(_)) => false,
            AppError::Auth(_) => true,
            AppError::Record(RecordError::NotAuthenticated) => true,
            AppError::Record(RecordError::PersistenceFailure { .. }) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_specific() {
        let err = ConversionError::NoRateAvailable {
            from: Currency::PEN,
            to: Currency::GBP,
        };
        assert_eq!(err.to_string(), "No rate available for PEN -> GBP");

        let err = ConversionError::InvalidAmount(AmountIssue::NotPositive);
        assert_eq!(err.to_string(), "Invalid amount: amount must be greater than zero");
    }

    #[test]
    fn test_app_error_from() {
        let err: AppError = RecordError::NotAuthenticated.into();
        assert!(matches!(err, AppError::Record(RecordError::NotAuthenticated)));
        assert!(err.is_user_correctable());

        let err: AppError = RecordError::PersistenceFailure {
            attempts: 3,
            reason: "timeout".into(),
        }
        .into();
        assert!(!err.is_user_correctable());
    }

    #[test]
    fn test_store_error_kinds() {
        assert!(StoreError::Transient("down".into()).is_transient());
        assert!(!StoreError::Permanent("bad".into()).is_transient());
    }
}
