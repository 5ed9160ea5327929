//! Guardrails applied after loading, before the config reaches the gateway.

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::models::StorageConfig;

/// Hard validation failures. A config that trips one of these never leaves
/// the loader.
#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("bucket name {name:?} is invalid: {reason}")]
    InvalidBucketName { name: String, reason: String },

    #[error("store endpoint {0:?} is not a valid host[:port]")]
    InvalidEndpoint(String),

    #[error("presign TTL must be nonzero")]
    ZeroPresignTtl,

    #[error("batch deadline must be nonzero when set")]
    ZeroBatchDeadline,
}

/// Suspicious but workable settings, surfaced for the operator's log.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Descriptors shorter than a minute tend to expire mid-download.
    ShortPresignTtl(Duration),
    /// Sub-second batch deadlines skip most units on a slow store.
    TightBatchDeadline(Duration),
}

#[derive(Debug, Default)]
pub struct ConfigWarnings(pub Vec<ConfigWarning>);

impl ConfigWarnings {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.0.iter()
    }
}

pub fn validate(config: &StorageConfig) -> Result<ConfigWarnings, ConfigGuardRailError> {
    validate_bucket_name(&config.bucket)?;
    validate_endpoint(&config.endpoint)?;

    if config.presign_ttl.is_zero() {
        return Err(ConfigGuardRailError::ZeroPresignTtl);
    }
    if config.batch_deadline.is_some_and(|d| d.is_zero()) {
        return Err(ConfigGuardRailError::ZeroBatchDeadline);
    }

    let mut warnings = ConfigWarnings::default();
    if config.presign_ttl < Duration::from_secs(60) {
        warnings
            .0
            .push(ConfigWarning::ShortPresignTtl(config.presign_ttl));
    }
    if let Some(deadline) = config.batch_deadline
        && deadline < Duration::from_secs(1)
    {
        warnings.0.push(ConfigWarning::TightBatchDeadline(deadline));
    }
    Ok(warnings)
}

/// S3-style bucket naming: 3-63 chars, lowercase alphanumerics and hyphens,
/// starting and ending on an alphanumeric.
pub fn validate_bucket_name(name: &str) -> Result<(), ConfigGuardRailError> {
    let invalid = |reason: &str| ConfigGuardRailError::InvalidBucketName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.len() < 3 || name.len() > 63 {
        return Err(invalid("length must be between 3 and 63 characters"));
    }
    if !name
        .bytes()
        .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'-'))
    {
        return Err(invalid(
            "only lowercase letters, digits, and hyphens are allowed",
        ));
    }
    let first = name.as_bytes()[0];
    let last = name.as_bytes()[name.len() - 1];
    if first == b'-' || last == b'-' {
        return Err(invalid("must start and end with a letter or digit"));
    }
    Ok(())
}

fn validate_endpoint(endpoint: &str) -> Result<(), ConfigGuardRailError> {
    let reject = || ConfigGuardRailError::InvalidEndpoint(endpoint.to_string());

    if endpoint.is_empty() || endpoint.contains('/') || endpoint.contains('@') {
        return Err(reject());
    }
    let probe = Url::parse(&format!("http://{endpoint}/")).map_err(|_| reject())?;
    if probe.host_str().is_none() {
        return Err(reject());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StoreCredentials;

    fn config() -> StorageConfig {
        StorageConfig {
            endpoint: "store.local:9000".to_string(),
            use_ssl: false,
            bucket: "tracks".to_string(),
            credentials: StoreCredentials {
                access_key: "key".to_string(),
                secret_key: "secret".to_string(),
            },
            presign_ttl: Duration::from_secs(24 * 60 * 60),
            batch_deadline: None,
        }
    }

    #[test]
    fn sane_config_passes_without_warnings() {
        let warnings = validate(&config()).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn bucket_names_are_checked_against_s3_rules() {
        assert!(validate_bucket_name("tracks").is_ok());
        assert!(validate_bucket_name("a-b-3").is_ok());
        assert!(validate_bucket_name("ab").is_err());
        assert!(validate_bucket_name("Tracks").is_err());
        assert!(validate_bucket_name("-tracks").is_err());
        assert!(validate_bucket_name("tracks-").is_err());
        assert!(validate_bucket_name(&"x".repeat(64)).is_err());
    }

    #[test]
    fn endpoints_with_paths_or_credentials_are_rejected() {
        let mut cfg = config();
        cfg.endpoint = "store.local:9000/api".to_string();
        assert!(matches!(
            validate(&cfg),
            Err(ConfigGuardRailError::InvalidEndpoint(_))
        ));

        cfg.endpoint = "user@store.local".to_string();
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn zero_durations_are_hard_errors() {
        let mut cfg = config();
        cfg.presign_ttl = Duration::ZERO;
        assert!(matches!(
            validate(&cfg),
            Err(ConfigGuardRailError::ZeroPresignTtl)
        ));

        let mut cfg = config();
        cfg.batch_deadline = Some(Duration::ZERO);
        assert!(matches!(
            validate(&cfg),
            Err(ConfigGuardRailError::ZeroBatchDeadline)
        ));
    }

    #[test]
    fn short_lifetimes_only_warn() {
        let mut cfg = config();
        cfg.presign_ttl = Duration::from_secs(5);
        cfg.batch_deadline = Some(Duration::from_millis(200));

        let warnings = validate(&cfg).unwrap();
        assert_eq!(warnings.0.len(), 2);
    }
}
