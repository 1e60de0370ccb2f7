//! Domain models for the currency converter.

pub mod conversion;
pub mod record;
pub mod user;

pub use conversion::{ConversionRequest, ConversionResult};
pub use record::{CONVERSIONS_COLLECTION, ConversionRecord, DocumentId, StoredDocument};
pub use user::UserId;
