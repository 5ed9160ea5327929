//! In-process reference backend for the Object Store Port.
//!
//! Presigned URLs issued here carry a real expiry: [`MemoryObjectStore::resolve`]
//! enforces the TTL against the tokio clock, so descriptor-lifetime behavior
//! is testable with a paused clock instead of a live object store. Fault
//! injection (`poison_name` / `poison_key`) simulates per-object outages for
//! batch-failure scenarios.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::store::ObjectStore;
use crate::types::{ObjectKey, PayloadItem};

#[derive(Debug)]
struct StoredObject {
    display_name: String,
    bytes: Vec<u8>,
}

#[derive(Debug)]
struct Grant {
    bucket: String,
    key: ObjectKey,
    expires_at: Instant,
}

/// Store-call counters, exposed so tests can assert that cancelled units
/// never issued their store call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OpCounts {
    pub puts: usize,
    pub presigns: usize,
    pub deletes: usize,
}

#[derive(Debug, Default)]
struct State {
    buckets: HashMap<String, HashMap<ObjectKey, StoredObject>>,
    grants: HashMap<Uuid, Grant>,
    poisoned_names: HashSet<String>,
    poisoned_keys: HashSet<ObjectKey>,
    counts: OpCounts,
}

#[derive(Debug)]
pub struct MemoryObjectStore {
    endpoint: String,
    state: RwLock<State>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::with_endpoint("object-store.local")
    }

    /// `endpoint` becomes the host of every generated presigned URL.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            state: RwLock::new(State::default()),
        }
    }

    /// Simulate an outage for every put whose payload carries this display
    /// name.
    pub async fn poison_name(&self, display_name: impl Into<String>) {
        let mut state = self.state.write().await;
        state.poisoned_names.insert(display_name.into());
    }

    /// Simulate an outage for presign/delete calls on this key.
    pub async fn poison_key(&self, key: ObjectKey) {
        let mut state = self.state.write().await;
        state.poisoned_keys.insert(key);
    }

    /// Clear all injected faults.
    pub async fn heal(&self) {
        let mut state = self.state.write().await;
        state.poisoned_names.clear();
        state.poisoned_keys.clear();
    }

    pub async fn op_counts(&self) -> OpCounts {
        self.state.read().await.counts
    }

    pub async fn contains(&self, bucket: &str, key: &ObjectKey) -> bool {
        let state = self.state.read().await;
        state
            .buckets
            .get(bucket)
            .is_some_and(|objects| objects.contains_key(key))
    }

    pub async fn object_count(&self, bucket: &str) -> usize {
        let state = self.state.read().await;
        state.buckets.get(bucket).map_or(0, HashMap::len)
    }

    /// Dereference a presigned URL the way the store's HTTP front door
    /// would: unknown or expired grants are rejected, live grants return the
    /// object bytes.
    pub async fn resolve(&self, url: &Url) -> Result<Vec<u8>> {
        let token = url
            .query_pairs()
            .find(|(name, _)| name == "token")
            .map(|(_, value)| value.into_owned())
            .ok_or_else(|| {
                StorageError::InvalidPayload("presigned URL is missing its token".to_string())
            })?;
        let token = Uuid::parse_str(&token).map_err(|_| {
            StorageError::InvalidPayload("presigned URL token is malformed".to_string())
        })?;

        let mut state = self.state.write().await;

        let grant = state
            .grants
            .get(&token)
            .ok_or_else(|| StorageError::NotFound("unknown presigned grant".to_string()))?;

        if Instant::now() >= grant.expires_at {
            let expired = state.grants.remove(&token);
            debug!(?expired, "rejecting expired presigned grant");
            return Err(StorageError::NotFound(
                "presigned grant has expired".to_string(),
            ));
        }

        let (bucket, key) = (grant.bucket.clone(), grant.key);
        state
            .buckets
            .get(&bucket)
            .and_then(|objects| objects.get(&key))
            .map(|object| object.bytes.clone())
            .ok_or_else(|| StorageError::NotFound(format!("{bucket}/{key}")))
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &ObjectKey,
        payload: PayloadItem,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state.counts.puts += 1;

        if state.poisoned_names.contains(&payload.display_name)
            || state.poisoned_keys.contains(key)
        {
            return Err(StorageError::Transient(format!(
                "simulated outage writing {}",
                payload.display_name
            )));
        }

        let objects = state.buckets.get_mut(bucket).ok_or_else(|| {
            StorageError::Transient(format!("bucket {bucket} does not exist"))
        })?;

        objects.insert(
            *key,
            StoredObject {
                display_name: payload.display_name,
                bytes: payload.bytes,
            },
        );
        Ok(())
    }

    async fn presigned_read(
        &self,
        bucket: &str,
        key: &ObjectKey,
        ttl: Duration,
    ) -> Result<Url> {
        let mut state = self.state.write().await;
        state.counts.presigns += 1;

        if state.poisoned_keys.contains(key) {
            return Err(StorageError::Transient(format!(
                "simulated outage presigning {key}"
            )));
        }

        let exists = state
            .buckets
            .get(bucket)
            .is_some_and(|objects| objects.contains_key(key));
        if !exists {
            return Err(StorageError::NotFound(format!("{bucket}/{key}")));
        }

        let token = Uuid::new_v4();
        state.grants.insert(
            token,
            Grant {
                bucket: bucket.to_string(),
                key: *key,
                expires_at: Instant::now() + ttl,
            },
        );

        Url::parse(&format!(
            "https://{}/{}/{}?token={}&expires={}",
            self.endpoint,
            bucket,
            key,
            token,
            ttl.as_secs()
        ))
        .map_err(|err| StorageError::Transient(format!("malformed presigned URL: {err}")))
    }

    async fn delete_object(&self, bucket: &str, key: &ObjectKey) -> Result<()> {
        let mut state = self.state.write().await;
        state.counts.deletes += 1;

        if state.poisoned_keys.contains(key) {
            return Err(StorageError::Transient(format!(
                "simulated outage deleting {key}"
            )));
        }

        let removed = state
            .buckets
            .get_mut(bucket)
            .and_then(|objects| objects.remove(key));
        match removed {
            Some(object) => {
                debug!(key = %key, name = %object.display_name, "deleted object");
                Ok(())
            }
            None => Err(StorageError::NotFound(format!("{bucket}/{key}"))),
        }
    }

    async fn ensure_bucket(&self, bucket: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.buckets.entry(bucket.to_string()).or_default();
        Ok(())
    }
}
