//! # Converter Hex
//!
//! Application layer for the currency converter.
//!
//! ## Architecture
//!
//! - `amount` - Amount text validation (typing filter and submit-time parse)
//! - `engine` - Rate-table conversion (pure, clock injected)
//! - `recorder` - Persists conversion records through the `DocumentStore` port
//! - `service` - Orchestrates identity, engine and recorder
//!
//! The service is generic over the identity and store ports, allowing
//! different adapters to be injected.

pub mod amount;
pub mod engine;
pub mod recorder;
pub mod service;


pub use amount::{accepts_partial_amount, parse_amount};
pub use engine::{ConversionEngine, convert};
pub use recorder::{ConversionRecorder, RecordHandle, RetryPolicy};
pub use service::{ConversionOutcome, ConverterService, RecordStatus};
