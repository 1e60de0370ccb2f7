//! Converter Application Service
//!
//! Orchestrates identity, conversion and record persistence through ports.
//! Contains NO infrastructure logic - pure business orchestration.

use std::sync::Arc;

use converter_types::{
    AppError, AuthError, Clock, ConversionRecord, ConversionRequest, ConversionResult, DocumentId,
    DocumentStore, IdentityProvider, RecordError, SystemClock, UserId,
};
use rate_table::RateTable;

use crate::engine::ConversionEngine;
use crate::recorder::{ConversionRecorder, RecordHandle};

/// What happened to the record of a conversion.
#[derive(Debug)]
pub enum RecordStatus {
    /// Persistence is running in the background.
    Dispatched(RecordHandle),
    /// No attempt was made.
    Skipped(RecordError),
}

/// A successful conversion together with its record status.
///
/// `result` is final regardless of how recording ends.
#[derive(Debug)]
pub struct ConversionOutcome {
    pub result: ConversionResult,
    pub record: RecordStatus,
}

impl ConversionOutcome {
    /// Waits for the record outcome. The conversion result is unaffected either way.
    pub async fn record_outcome(self) -> (ConversionResult, Result<DocumentId, RecordError>) {
        let outcome = match self.record {
            RecordStatus::Dispatched(handle) => handle.outcome().await,
            RecordStatus::Skipped(e) => Err(e),
        };
        (self.result, outcome)
    }
}

/// Application service for the converter.
///
/// Generic over the identity and store ports - adapters are injected at compile time.
pub struct ConverterService<I: IdentityProvider, S: DocumentStore, C: Clock = SystemClock> {
    identity: I,
    engine: ConversionEngine<C>,
    recorder: ConversionRecorder<S>,
}

impl<I: IdentityProvider, S: DocumentStore, C: Clock> ConverterService<I, S, C> {
    pub fn new(identity: I, engine: ConversionEngine<C>, recorder: ConversionRecorder<S>) -> Self {
        Self {
            identity,
            engine,
            recorder,
        }
    }

    /// Returns a reference to the identity provider.
    pub fn identity(&self) -> &I {
        &self.identity
    }

    /// Returns a reference to the recorder.
    pub fn recorder(&self) -> &ConversionRecorder<S> {
        &self.recorder
    }

    /// Snapshot of the active rate table.
    pub fn rates(&self) -> Arc<RateTable> {
        self.engine.rates().snapshot()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────────────

    /// Signs in with email and password.
    #[tracing::instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserId, AppError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials.into());
        }

        let user_id = self.identity.sign_in(email.trim(), password).await?;
        tracing::info!(user_id = %user_id, "Signed in");
        Ok(user_id)
    }

    /// Ends the current session.
    pub fn sign_out(&self) {
        if let Some(user_id) = self.identity.current_user() {
            tracing::info!(user_id = %user_id, "Signing out");
        }
        self.identity.sign_out();
    }

    pub fn current_user(&self) -> Option<UserId> {
        self.identity.current_user()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Conversion
    // ─────────────────────────────────────────────────────────────────────────────

    /// Converts and, on success, starts recording for the current user.
    ///
    /// Validation failures are returned as errors. Recording problems are
    /// reported only through [`ConversionOutcome::record`].
    #[tracing::instrument(skip(self))]
    pub async fn convert(&self, req: ConversionRequest) -> Result<ConversionOutcome, AppError> {
        let result = self.engine.convert(&req)?;

        let record = match self.recorder.dispatch(&result, self.identity.current_user()) {
            Ok(handle) => RecordStatus::Dispatched(handle),
            Err(e) => {
                tracing::warn!("Conversion not recorded: {}", e);
                RecordStatus::Skipped(e)
            }
        };

        Ok(ConversionOutcome { result, record })
    }

    /// Lists the current user's recorded conversions, newest first.
    pub async fn history(&self) -> Result<Vec<ConversionRecord>, AppError> {
        let user_id = self
            .identity
            .current_user()
            .ok_or(RecordError::NotAuthenticated)?;

        self.recorder.history(&user_id).await.map_err(Into::into)
    }
}
