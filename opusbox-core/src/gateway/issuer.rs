use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use crate::error::Result;
use crate::store::ObjectStore;
use crate::types::{AccessDescriptor, ObjectKey};

/// Default descriptor lifetime: 24 hours.
pub const DEFAULT_PRESIGN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Wraps the store's presign primitive with a fixed TTL.
///
/// Stateless and cache-free: every call produces a fresh descriptor, so the
/// result is idempotent in effect but not in wire representation.
#[derive(Clone)]
pub struct DescriptorIssuer {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    ttl: Duration,
}

impl DescriptorIssuer {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Produce a time-limited retrieval handle for `key`.
    pub async fn issue(&self, key: ObjectKey) -> Result<AccessDescriptor> {
        let url = self.store.presigned_read(&self.bucket, &key, self.ttl).await?;
        let expires_at = Utc::now() + chrono::Duration::seconds(self.ttl.as_secs() as i64);
        debug!(key = %key, %expires_at, "issued access descriptor");
        Ok(AccessDescriptor {
            key,
            url,
            expires_at,
        })
    }
}

impl fmt::Debug for DescriptorIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorIssuer")
            .field("bucket", &self.bucket)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
