//! Gateway Facade: the public contract of the batch object-storage gateway.
//!
//! Six operations (create/read/delete, one/many) plus startup bucket
//! provisioning. Single-item operations call the store directly and return
//! the specific error; batch operations fan out through the
//! [`BatchCoordinator`] and aggregate per-key outcomes.

pub mod issuer;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::batch::{BatchCoordinator, BatchOptions};
use crate::error::{AggregateBatchError, PerItemFailure, Result, StorageError};
use crate::store::ObjectStore;
use crate::types::{AccessDescriptor, BatchReport, ObjectKey, PayloadItem};

pub use issuer::{DEFAULT_PRESIGN_TTL, DescriptorIssuer};

/// Construction-time configuration for the facade. No global state: the
/// embedding application owns config loading and passes this in by value.
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    /// Store-side container for every object this gateway manages.
    pub bucket: String,
    /// Lifetime of issued access descriptors.
    pub presign_ttl: Duration,
    /// Optional wall-clock bound per batch; `None` leaves batches unbounded.
    pub batch_deadline: Option<Duration>,
}

impl GatewayOptions {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            presign_ttl: DEFAULT_PRESIGN_TTL,
            batch_deadline: None,
        }
    }

    pub fn with_presign_ttl(mut self, ttl: Duration) -> Self {
        self.presign_ttl = ttl;
        self
    }

    pub fn with_batch_deadline(mut self, deadline: Duration) -> Self {
        self.batch_deadline = Some(deadline);
        self
    }
}

/// Facade over one bucket of one object store.
pub struct StorageGateway {
    store: Arc<dyn ObjectStore>,
    issuer: DescriptorIssuer,
    coordinator: BatchCoordinator,
    bucket: String,
}

impl StorageGateway {
    pub fn new(store: Arc<dyn ObjectStore>, options: GatewayOptions) -> Self {
        let issuer = DescriptorIssuer::new(
            Arc::clone(&store),
            options.bucket.clone(),
            options.presign_ttl,
        );
        Self {
            store,
            issuer,
            coordinator: BatchCoordinator::new(BatchOptions {
                deadline: options.batch_deadline,
            }),
            bucket: options.bucket,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Provision the bucket. Run once at startup, before serving traffic.
    pub async fn initialize(&self) -> Result<()> {
        info!(bucket = %self.bucket, "ensuring gateway bucket exists");
        self.store.ensure_bucket(&self.bucket).await
    }

    /// Store one payload under a fresh key and return its descriptor.
    pub async fn create_one(&self, payload: PayloadItem) -> Result<AccessDescriptor> {
        payload.validate()?;
        let key = ObjectKey::new();
        debug!(key = %key, name = %payload.display_name, size = payload.size(), "storing object");
        self.store.put_object(&self.bucket, &key, payload).await?;
        self.issuer.issue(key).await
    }

    /// Store every labeled payload concurrently, one fresh key per label.
    ///
    /// All-or-error surface: on any failure the returned
    /// [`AggregateBatchError`] names every failed label with its cause, the
    /// labels that succeeded (their objects exist; recover descriptors via
    /// the keys the caller persisted or re-submit), and the labels skipped
    /// by cancellation.
    pub async fn create_many(
        &self,
        payloads: HashMap<String, PayloadItem>,
    ) -> Result<Vec<AccessDescriptor>> {
        for payload in payloads.values() {
            payload.validate()?;
        }

        info!(bucket = %self.bucket, items = payloads.len(), "storing object batch");
        let units: Vec<_> = payloads
            .into_iter()
            .map(|(label, payload)| {
                let store = Arc::clone(&self.store);
                let issuer = self.issuer.clone();
                let bucket = self.bucket.clone();
                let key = ObjectKey::new();
                (label, async move {
                    store.put_object(&bucket, &key, payload).await?;
                    issuer.issue(key).await
                })
            })
            .collect();

        collect_created(self.coordinator.run(units).await)
    }

    /// Issue a fresh descriptor for one existing object.
    pub async fn read_one(&self, key: &ObjectKey) -> Result<AccessDescriptor> {
        self.issuer.issue(*key).await
    }

    /// Issue descriptors for every key concurrently.
    pub async fn read_many(&self, keys: &[ObjectKey]) -> Result<Vec<AccessDescriptor>> {
        reject_duplicate_keys(keys)?;

        info!(bucket = %self.bucket, items = keys.len(), "issuing descriptor batch");
        let units: Vec<_> = keys
            .iter()
            .copied()
            .map(|key| {
                let issuer = self.issuer.clone();
                (key, async move { issuer.issue(key).await })
            })
            .collect();

        collect(self.coordinator.run(units).await)
    }

    /// Remove one object. `NotFound` if the key does not exist.
    pub async fn delete_one(&self, key: &ObjectKey) -> Result<()> {
        debug!(key = %key, bucket = %self.bucket, "deleting object");
        self.store.delete_object(&self.bucket, key).await
    }

    /// Remove every key concurrently.
    ///
    /// On failure the aggregate names the keys that were actually deleted
    /// alongside the per-key causes, so callers can reconcile instead of
    /// guessing.
    pub async fn delete_many(&self, keys: &[ObjectKey]) -> Result<()> {
        reject_duplicate_keys(keys)?;

        info!(bucket = %self.bucket, items = keys.len(), "deleting object batch");
        let units: Vec<_> = keys
            .iter()
            .copied()
            .map(|key| {
                let store = Arc::clone(&self.store);
                let bucket = self.bucket.clone();
                (key, async move { store.delete_object(&bucket, &key).await })
            })
            .collect();

        collect(self.coordinator.run(units).await).map(|_: Vec<()>| ())
    }
}

impl fmt::Debug for StorageGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageGateway")
            .field("bucket", &self.bucket)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

fn reject_duplicate_keys(keys: &[ObjectKey]) -> Result<()> {
    let mut seen = HashSet::with_capacity(keys.len());
    for key in keys {
        if !seen.insert(*key) {
            return Err(StorageError::DuplicateKey(key.to_string()));
        }
    }
    Ok(())
}

/// Map a finished batch onto the facade contract: plain values when every
/// unit succeeded, an aggregate that loses nothing otherwise.
///
/// The deadline alone does not fail a batch. It is advisory, so a batch
/// whose timer fired but whose in-flight units all completed has produced
/// every value; an aggregate only exists when units failed or were skipped.
fn collect<K, T>(report: BatchReport<K, T>) -> Result<Vec<T>>
where
    K: fmt::Display,
{
    let parts = report.partition();
    if parts.failures.is_empty() && parts.skipped.is_empty() {
        return Ok(parts
            .successes
            .into_iter()
            .map(|(_, value)| value)
            .collect());
    }

    let succeeded = parts
        .successes
        .iter()
        .map(|(key, _)| key.to_string())
        .collect();
    Err(into_aggregate(parts, succeeded))
}

/// Create batches correlate failures by caller label, but a succeeded unit's
/// durable handle is the generated object key. Surface that, or partial
/// successes would be unretrievable.
fn collect_created(
    report: BatchReport<String, AccessDescriptor>,
) -> Result<Vec<AccessDescriptor>> {
    let parts = report.partition();
    if parts.failures.is_empty() && parts.skipped.is_empty() {
        return Ok(parts
            .successes
            .into_iter()
            .map(|(_, value)| value)
            .collect());
    }

    let succeeded = parts
        .successes
        .iter()
        .map(|(_, descriptor)| descriptor.key.to_string())
        .collect();
    Err(into_aggregate(parts, succeeded))
}

fn into_aggregate<K, T>(
    parts: crate::types::BatchPartition<K, T>,
    succeeded: Vec<String>,
) -> StorageError
where
    K: fmt::Display,
{
    let aggregate = AggregateBatchError {
        failures: parts
            .failures
            .into_iter()
            .map(|(key, cause)| PerItemFailure {
                key: key.to_string(),
                cause,
            })
            .collect(),
        succeeded,
        skipped: parts.skipped.iter().map(ToString::to_string).collect(),
        deadline_hit: parts.deadline_hit,
    };
    warn!(
        failed = aggregate.failures.len(),
        succeeded = aggregate.succeeded.len(),
        skipped = aggregate.skipped.len(),
        deadline_hit = aggregate.deadline_hit,
        "batch finished with failures"
    );
    StorageError::Batch(aggregate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryObjectStore, MockObjectStore};

    fn options() -> GatewayOptions {
        GatewayOptions::new("tracks").with_presign_ttl(Duration::from_secs(300))
    }

    async fn gateway_with_memory_store() -> (StorageGateway, Arc<MemoryObjectStore>) {
        let store = Arc::new(MemoryObjectStore::new());
        let gateway = StorageGateway::new(
            Arc::clone(&store) as Arc<dyn ObjectStore>,
            options(),
        );
        gateway.initialize().await.unwrap();
        (gateway, store)
    }

    #[tokio::test]
    async fn create_one_stores_and_issues_a_descriptor() {
        let (gateway, store) = gateway_with_memory_store().await;

        let descriptor = gateway
            .create_one(PayloadItem::new("intro.flac", b"riff".to_vec()))
            .await
            .unwrap();

        assert!(store.contains("tracks", &descriptor.key).await);
        assert_eq!(store.resolve(&descriptor.url).await.unwrap(), b"riff");
    }

    #[tokio::test]
    async fn create_one_skips_presign_when_the_put_fails() {
        let mut mock = MockObjectStore::new();
        mock.expect_put_object()
            .times(1)
            .returning(|_, _, _| Err(StorageError::Transient("store down".into())));
        mock.expect_presigned_read().times(0);

        let gateway = StorageGateway::new(Arc::new(mock), options());
        let err = gateway
            .create_one(PayloadItem::new("x.flac", vec![0]))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Transient(_)));
    }

    #[tokio::test]
    async fn create_many_of_nothing_is_empty() {
        let (gateway, _) = gateway_with_memory_store().await;
        let descriptors = gateway.create_many(HashMap::new()).await.unwrap();
        assert!(descriptors.is_empty());
    }

    #[tokio::test]
    async fn duplicate_keys_are_rejected_before_any_store_call() {
        let (gateway, store) = gateway_with_memory_store().await;

        let key = ObjectKey::new();
        let err = gateway.read_many(&[key, key]).await.unwrap_err();
        assert!(matches!(err, StorageError::DuplicateKey(_)));
        assert_eq!(store.op_counts().await.presigns, 0);

        let err = gateway.delete_many(&[key, key]).await.unwrap_err();
        assert!(matches!(err, StorageError::DuplicateKey(_)));
        assert_eq!(store.op_counts().await.deletes, 0);
    }

    #[tokio::test]
    async fn invalid_payload_fails_the_batch_before_fan_out() {
        let (gateway, store) = gateway_with_memory_store().await;

        let mut payloads = HashMap::new();
        payloads.insert("ok".to_string(), PayloadItem::new("a.flac", vec![1]));
        payloads.insert("blank".to_string(), PayloadItem::new("  ", vec![2]));

        let err = gateway.create_many(payloads).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidPayload(_)));
        assert_eq!(store.op_counts().await.puts, 0);
    }

    #[tokio::test]
    async fn delete_many_reports_missing_keys_and_still_deletes_the_rest() {
        let (gateway, store) = gateway_with_memory_store().await;

        let kept = gateway
            .create_one(PayloadItem::new("keep.flac", vec![1]))
            .await
            .unwrap()
            .key;
        let missing = ObjectKey::new();

        let err = gateway.delete_many(&[kept, missing]).await.unwrap_err();
        let StorageError::Batch(aggregate) = err else {
            panic!("expected aggregate batch error");
        };

        // The missing key failed with NotFound; the other either completed
        // or was preempted by the cancellation it triggered.
        assert_eq!(aggregate.failures.len(), 1);
        assert_eq!(aggregate.failures[0].key, missing.to_string());
        assert!(matches!(
            aggregate.failures[0].cause,
            StorageError::NotFound(_)
        ));
        assert_eq!(aggregate.total_units(), 2);

        if aggregate.succeeded.contains(&kept.to_string()) {
            assert!(!store.contains("tracks", &kept).await);
        }
    }
}
