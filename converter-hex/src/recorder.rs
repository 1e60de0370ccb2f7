//! Conversion record persistence.
//!
//! Builds a [`ConversionRecord`] from a completed conversion and hands it to
//! the document store. Persistence is secondary to the conversion: its
//! outcome is reported separately and never alters the `ConversionResult`.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use converter_types::{
    CONVERSIONS_COLLECTION, ConversionRecord, ConversionResult, DocumentId, DocumentStore,
    RecordError, UserId,
};

/// Bounded retry for transient store failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total store calls per record, including the first
    pub max_attempts: u32,
    /// Delay after the first failed attempt; grows linearly per attempt
    pub base_backoff: Duration,
    /// Upper bound on any single delay
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before the attempt following `attempt`, without jitter.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.base_backoff
            .saturating_mul(attempt)
            .min(self.max_backoff)
    }

    fn jittered_backoff_for(&self, attempt: u32) -> Duration {
        let delay = self.backoff_for(attempt);
        let spread = delay.as_millis() as u64 / 10;
        if spread == 0 {
            return delay;
        }
        delay + Duration::from_millis(rand::rng().random_range(0..=spread))
    }
}

/// Awaitable outcome of a dispatched record.
#[derive(Debug)]
pub struct RecordHandle {
    task: JoinHandle<Result<DocumentId, RecordError>>,
}

impl RecordHandle {
    /// Waits for the record attempt to finish.
    pub async fn outcome(self) -> Result<DocumentId, RecordError> {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => Err(RecordError::PersistenceFailure {
                attempts: 0,
                reason: format!("record task did not complete: {}", e),
            }),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Persists conversion records through a [`DocumentStore`].
pub struct ConversionRecorder<S: DocumentStore> {
    store: Arc<S>,
    retry: RetryPolicy,
}

impl<S: DocumentStore> ConversionRecorder<S> {
    /// Creates a recorder with the default retry policy.
    pub fn new(store: S) -> Self {
        Self::from_shared(Arc::new(store))
    }

    /// Creates a recorder over a store that is shared with other components.
    pub fn from_shared(store: Arc<S>) -> Self {
        Self {
            store,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Persists `result` for `user_id` and waits for the outcome.
    ///
    /// Without a user the call fails with `NotAuthenticated` and the store is not touched.
    pub async fn record(
        &self,
        result: &ConversionResult,
        user_id: Option<UserId>,
    ) -> Result<DocumentId, RecordError> {
        let user_id = user_id.ok_or(RecordError::NotAuthenticated)?;
        let record = ConversionRecord::new(result, user_id);
        persist(Arc::clone(&self.store), self.retry, record).await
    }

    /// Starts persisting `result` in the background and returns immediately.
    ///
    /// `NotAuthenticated` is reported synchronously. Otherwise the attempt runs
    /// to completion on its own task, unordered relative to other dispatches.
    /// Must be called from within a Tokio runtime.
    pub fn dispatch(
        &self,
        result: &ConversionResult,
        user_id: Option<UserId>,
    ) -> Result<RecordHandle, RecordError> {
        let user_id = user_id.ok_or(RecordError::NotAuthenticated)?;
        let record = ConversionRecord::new(result, user_id);
        let task = tokio::spawn(persist(Arc::clone(&self.store), self.retry, record));
        Ok(RecordHandle { task })
    }

    /// Lists the records of `user_id`, newest first.
    ///
    /// Documents in the collection that do not decode as records are skipped.
    #[instrument(skip(self))]
    pub async fn history(&self, user_id: &UserId) -> Result<Vec<ConversionRecord>, RecordError> {
        let documents = self
            .store
            .list(CONVERSIONS_COLLECTION)
            .await
            .map_err(|e| RecordError::PersistenceFailure {
                attempts: 1,
                reason: e.to_string(),
            })?;

        let mut records: Vec<ConversionRecord> = documents
            .iter()
            .filter_map(|doc| match ConversionRecord::from_document(&doc.body) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(document_id = %doc.id, "Skipping undecodable record: {}", e);
                    None
                }
            })
            .filter(|record| &record.user_id == user_id)
            .collect();

        records.sort_by(|a, b| b.computed_at.cmp(&a.computed_at));
        Ok(records)
    }
}

#[instrument(skip(store, retry, record), fields(user_id = %record.user_id, source = %record.source, target = %record.target))]
async fn persist<S: DocumentStore>(
    store: Arc<S>,
    retry: RetryPolicy,
    record: ConversionRecord,
) -> Result<DocumentId, RecordError> {
    let document = record
        .to_document()
        .map_err(|e| RecordError::PersistenceFailure {
            attempts: 0,
            reason: format!("record could not be encoded: {}", e),
        })?;

    let max_attempts = retry.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match store.add(CONVERSIONS_COLLECTION, document.clone()).await {
            Ok(id) => {
                info!(document_id = %id, attempt, "Conversion saved");
                return Ok(id);
            }
            Err(e) if e.is_transient() && attempt < max_attempts => {
                let delay = retry.jittered_backoff_for(attempt);
                warn!(attempt, ?delay, "Transient store failure, retrying: {}", e);
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                error!(attempt, "Failed to save conversion: {}", e);
                return Err(RecordError::PersistenceFailure {
                    attempts: attempt,
                    reason: e.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_is_linear_and_capped() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(250),
        };
        assert_eq!(policy.backoff_for(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(5), Duration::from_millis(250));
    }

    #[test]
    fn test_jitter_stays_within_ten_percent() {
        let policy = RetryPolicy::default();
        for attempt in 1..5 {
            let base = policy.backoff_for(attempt);
            let jittered = policy.jittered_backoff_for(attempt);
            assert!(jittered >= base);
            assert!(jittered <= base + base / 10);
        }
    }
}
