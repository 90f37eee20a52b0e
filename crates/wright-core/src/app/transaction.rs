use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::factory::error::BoxError;
use crate::service::error::ServiceError;
use crate::service::AppService;

/// Handle of an open transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionId(u64);

impl TransactionId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx-{}", self.0)
    }
}

/// Tracks open transactions. Owned by the server and registered as the
/// `transactionManager` service.
#[derive(Debug, Default)]
pub struct TransactionManager {
    next_id: AtomicU64,
    open: Mutex<BTreeSet<TransactionId>>,
}

impl TransactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> TransactionId {
        let id = TransactionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.open.lock().insert(id);
        id
    }

    pub fn commit(&self, id: TransactionId) -> Result<(), ServiceError> {
        self.finish(id)
    }

    pub fn rollback(&self, id: TransactionId) -> Result<(), ServiceError> {
        self.finish(id)
    }

    pub fn open_transactions(&self) -> usize {
        self.open.lock().len()
    }

    fn finish(&self, id: TransactionId) -> Result<(), ServiceError> {
        if self.open.lock().remove(&id) {
            Ok(())
        } else {
            Err(ServiceError::UnknownTransaction(id.value()))
        }
    }
}

#[async_trait]
impl AppService for TransactionManager {
    async fn start(&self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Roll back whatever is still open.
    async fn stop(&self) -> Result<(), BoxError> {
        let open = std::mem::take(&mut *self.open.lock());
        for id in open {
            log::warn!("Rolling back {} on shutdown", id);
        }
        Ok(())
    }
}
