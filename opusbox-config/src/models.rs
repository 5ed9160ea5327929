use std::fmt;
use std::time::Duration;

use opusbox_core::gateway::GatewayOptions;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Static credentials for the object store. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct StoreCredentials {
    pub access_key: String,
    pub secret_key: String,
}

impl fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Everything the gateway needs to talk to its object store.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Store endpoint as `host[:port]`, without a scheme.
    pub endpoint: String,
    pub use_ssl: bool,
    pub bucket: String,
    pub credentials: StoreCredentials,
    /// Lifetime of issued access descriptors. Defaults to 24 hours.
    pub presign_ttl: Duration,
    /// Optional wall-clock bound per batch operation.
    pub batch_deadline: Option<Duration>,
}

impl StorageConfig {
    /// Endpoint with the scheme implied by `use_ssl`.
    pub fn endpoint_url(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };
        format!("{scheme}://{}", self.endpoint)
    }

    /// Construction-time options for the gateway facade.
    pub fn gateway_options(&self) -> GatewayOptions {
        let options = GatewayOptions::new(self.bucket.as_str())
            .with_presign_ttl(self.presign_ttl);
        match self.batch_deadline {
            Some(deadline) => options.with_batch_deadline(deadline),
            None => options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StorageConfig {
        StorageConfig {
            endpoint: "store.local:9000".to_string(),
            use_ssl: true,
            bucket: "tracks".to_string(),
            credentials: StoreCredentials {
                access_key: "opusbox".to_string(),
                secret_key: "hunter2".to_string(),
            },
            presign_ttl: Duration::from_secs(600),
            batch_deadline: Some(Duration::from_secs(30)),
        }
    }

    #[test]
    fn endpoint_url_follows_the_ssl_flag() {
        let mut cfg = config();
        assert_eq!(cfg.endpoint_url(), "https://store.local:9000");
        cfg.use_ssl = false;
        assert_eq!(cfg.endpoint_url(), "http://store.local:9000");
    }

    #[test]
    fn gateway_options_carry_ttl_and_deadline() {
        let options = config().gateway_options();
        assert_eq!(options.bucket, "tracks");
        assert_eq!(options.presign_ttl, Duration::from_secs(600));
        assert_eq!(options.batch_deadline, Some(Duration::from_secs(30)));
    }

    #[test]
    fn debug_output_never_leaks_the_secret() {
        let rendered = format!("{:?}", config());
        assert!(rendered.contains("opusbox"));
        assert!(!rendered.contains("hunter2"));
    }
}
