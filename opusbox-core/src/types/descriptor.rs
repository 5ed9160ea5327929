use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

use crate::types::ids::ObjectKey;

/// Time-limited retrieval handle for one stored object.
///
/// Never persisted; the issuer regenerates a fresh descriptor on every read.
/// `expires_at` mirrors the TTL baked into the signed URL so API layers can
/// surface it without parsing the URL.
#[derive(Debug, Clone, Serialize)]
pub struct AccessDescriptor {
    pub key: ObjectKey,
    pub url: Url,
    pub expires_at: DateTime<Utc>,
}

impl AccessDescriptor {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
