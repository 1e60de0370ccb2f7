//! # Converter Types
//!
//! Domain types and port traits for the currency converter.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (requests, results, records, identifiers)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for presentation boundaries
//! - `error/` - Conversion, recording and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    CONVERSIONS_COLLECTION, ConversionRecord, ConversionRequest, ConversionResult, DocumentId,
    StoredDocument, UserId,
};
pub use dto::*;
pub use error::{AmountIssue, AppError, AuthError, ConversionError, RecordError, StoreError};
pub use ports::{Clock, DocumentStore, FixedClock, IdentityProvider, SystemClock};
pub use rate_table::{Currency, RateTable, RateTableHandle};
