use thiserror::Error;

/// Error taxonomy for gateway and store operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("transient store error: {0}")]
    Transient(String),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("duplicate key in batch: {0}")]
    DuplicateKey(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error(transparent)]
    Batch(#[from] AggregateBatchError),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Failure outcome for one key within a batch.
///
/// `key` is the caller's correlation handle: the label for create-many,
/// the object key string for read-many/delete-many.
#[derive(Debug)]
pub struct PerItemFailure {
    pub key: String,
    pub cause: StorageError,
}

/// Aggregate failure for a batch operation.
///
/// Carries every per-item cause that units actually produced, plus the keys
/// that succeeded and the keys that were skipped after cancellation, so the
/// caller can act per key instead of parsing a joined string.
#[derive(Error, Debug)]
#[error(
    "batch failed: {} of {} units failed ({} succeeded, {} skipped{})",
    failures.len(),
    failures.len() + succeeded.len() + skipped.len(),
    succeeded.len(),
    skipped.len(),
    if *deadline_hit { ", deadline hit" } else { "" }
)]
pub struct AggregateBatchError {
    /// Per-key causes from units that ran and failed.
    pub failures: Vec<PerItemFailure>,
    /// Durable handles of units that completed before the batch failed:
    /// object keys. For create batches these are the generated keys (the
    /// objects exist in the store), not the caller's labels.
    pub succeeded: Vec<String>,
    /// Keys whose units observed cancellation and never issued a store call.
    pub skipped: Vec<String>,
    /// Whether the batch deadline fired before all units reported.
    pub deadline_hit: bool,
}

impl AggregateBatchError {
    /// Number of units the batch covered (failed + succeeded + skipped).
    pub fn total_units(&self) -> usize {
        self.failures.len() + self.succeeded.len() + self.skipped.len()
    }
}
