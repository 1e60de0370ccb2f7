//! Durable conversion records.

use chrono::{DateTime, Utc};
use rate_table::Currency;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::conversion::ConversionResult;
use super::user::UserId;

/// Logical collection that holds conversion records.
pub const CONVERSIONS_COLLECTION: &str = "conversions";

/// Unique identifier assigned by the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Creates a new random DocumentId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a DocumentId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A conversion attributed to the user who performed it.
///
/// Records are self-contained and timestamped, so they may be persisted in
/// any order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub user_id: UserId,
    pub computed_at: DateTime<Utc>,
    pub amount: f64,
    pub source: Currency,
    pub target: Currency,
    pub rate: f64,
    pub converted: f64,
}

impl ConversionRecord {
    pub fn new(result: &ConversionResult, user_id: UserId) -> Self {
        Self {
            user_id,
            computed_at: result.computed_at,
            amount: result.amount,
            source: result.source,
            target: result.target,
            rate: result.rate,
            converted: result.converted,
        }
    }

    /// The conversion this record was built from.
    pub fn result(&self) -> ConversionResult {
        ConversionResult {
            amount: self.amount,
            source: self.source,
            target: self.target,
            rate: self.rate,
            converted: self.converted,
            computed_at: self.computed_at,
        }
    }

    pub fn to_document(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn from_document(document: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(document)
    }
}

/// A document as held by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub collection: String,
    pub body: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_document_shape() {
        let result = ConversionResult::compute(50.0, Currency::USD, Currency::PEN, 3.8, Utc::now());
        let record = ConversionRecord::new(&result, UserId::new("user-1"));
        let doc = record.to_document().unwrap();

        assert_eq!(doc["user_id"], "user-1");
        assert_eq!(doc["source"], "USD");
        assert_eq!(doc["target"], "PEN");
        assert_eq!(doc["rate"], 3.8);
        assert!(doc.get("computed_at").is_some());

        let back = ConversionRecord::from_document(&doc).unwrap();
        assert_eq!(back.result(), result);
    }
}
