//! Object Store Port: the four single-object primitives the gateway
//! orchestrates. The gateway never reaches around this trait, so any
//! S3-compatible binding (or the in-process [`MemoryObjectStore`]) can sit
//! behind it.

pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::Result;
use crate::types::{ObjectKey, PayloadItem};

pub use memory::{MemoryObjectStore, OpCounts};

/// Single-object primitives of a key-addressed blob store.
///
/// Contract notes beyond the signatures:
/// - `presigned_read` verifies existence: a missing key is `NotFound`, not a
///   dangling URL.
/// - `delete_object` returns `NotFound` for a missing key, so a double
///   delete surfaces as an error rather than succeeding silently.
/// - `ensure_bucket` is idempotent and safe to call on every startup.
/// - Implementations must tolerate concurrent calls; the batch coordinator
///   shares one client across all units of a batch.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write one object under `key`. The payload's display name may be
    /// recorded as object metadata; it is never part of the key.
    async fn put_object(
        &self,
        bucket: &str,
        key: &ObjectKey,
        payload: PayloadItem,
    ) -> Result<()>;

    /// Produce a time-limited read URL for `key`, valid for `ttl`.
    async fn presigned_read(
        &self,
        bucket: &str,
        key: &ObjectKey,
        ttl: Duration,
    ) -> Result<Url>;

    /// Remove one object. `NotFound` if the key does not exist.
    async fn delete_object(&self, bucket: &str, key: &ObjectKey) -> Result<()>;

    /// Create the bucket if it does not exist yet.
    async fn ensure_bucket(&self, bucket: &str) -> Result<()>;
}
