//! Shared, swappable access to the active rate table.

use std::sync::{Arc, RwLock};

use crate::RateTable;

/// Cloneable handle to the active [`RateTable`].
///
/// Readers take an `Arc` snapshot and keep using it for the whole operation;
/// `replace` swaps the pointer, so a snapshot is never partially updated.
#[derive(Debug, Clone)]
pub struct RateTableHandle {
    inner: Arc<RwLock<Arc<RateTable>>>,
}

impl RateTableHandle {
    pub fn new(table: RateTable) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(table))),
        }
    }

    /// Returns the table active at the time of the call.
    pub fn snapshot(&self) -> Arc<RateTable> {
        match self.inner.read() {
            Ok(guard) => Arc::clone(&*guard),
            // The lock only guards a pointer swap, so a poisoned value is still whole.
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// Installs `table` for all subsequent snapshots and returns the previous one.
    pub fn replace(&self, table: RateTable) -> Arc<RateTable> {
        let next = Arc::new(table);
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, next)
    }
}

impl Default for RateTableHandle {
    fn default() -> Self {
        Self::new(RateTable::default_table())
    }
}

impl From<RateTable> for RateTableHandle {
    fn from(table: RateTable) -> Self {
        Self::new(table)
    }
}
