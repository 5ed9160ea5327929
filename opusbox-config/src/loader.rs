//! Environment-driven loading for [`StorageConfig`].
//!
//! Resolution order per value: explicit environment variable, then (for the
//! secret key) a `*_FILE` indirection pointing at a mounted secret, then the
//! documented default. A `.env` file is honored when present.

use std::fs::read_to_string;
use std::time::Duration;

use thiserror::Error;

use opusbox_core::DEFAULT_PRESIGN_TTL;

use crate::models::{StorageConfig, StoreCredentials};
use crate::validation::{self, ConfigGuardRailError, ConfigWarnings};

pub const ENV_ENDPOINT: &str = "OPUSBOX_STORE_ENDPOINT";
pub const ENV_USE_SSL: &str = "OPUSBOX_STORE_USE_SSL";
pub const ENV_BUCKET: &str = "OPUSBOX_STORE_BUCKET";
pub const ENV_ACCESS_KEY: &str = "OPUSBOX_STORE_ACCESS_KEY";
pub const ENV_SECRET_KEY: &str = "OPUSBOX_STORE_SECRET_KEY";
pub const ENV_SECRET_KEY_FILE: &str = "OPUSBOX_STORE_SECRET_KEY_FILE";
pub const ENV_PRESIGN_TTL: &str = "OPUSBOX_PRESIGN_TTL";
pub const ENV_BATCH_DEADLINE: &str = "OPUSBOX_BATCH_DEADLINE";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("missing required variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },

    #[error("failed to read secret file {path}: {source}")]
    SecretFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    GuardRail(#[from] ConfigGuardRailError),
}

/// A validated config plus any non-fatal warnings for the operator's log.
#[derive(Debug)]
pub struct ConfigLoad {
    pub config: StorageConfig,
    pub warnings: ConfigWarnings,
}

#[derive(Debug, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from the process environment, honoring a `.env` file if present.
    pub fn from_env() -> Result<ConfigLoad, ConfigLoadError> {
        dotenvy::dotenv().ok();
        Self::load_with(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary lookup. Tests inject a map here instead of
    /// mutating the process environment.
    pub fn load_with(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let endpoint = require(&lookup, ENV_ENDPOINT)?;
        let bucket = require(&lookup, ENV_BUCKET)?;
        let access_key = require(&lookup, ENV_ACCESS_KEY)?;
        let secret_key = resolve_secret_key(&lookup)?;

        let use_ssl = match lookup(ENV_USE_SSL) {
            Some(raw) => parse_bool(ENV_USE_SSL, &raw)?,
            None => false,
        };

        let presign_ttl = match lookup(ENV_PRESIGN_TTL) {
            Some(raw) => parse_duration(ENV_PRESIGN_TTL, &raw)?,
            None => DEFAULT_PRESIGN_TTL,
        };

        let batch_deadline = lookup(ENV_BATCH_DEADLINE)
            .map(|raw| parse_duration(ENV_BATCH_DEADLINE, &raw))
            .transpose()?;

        let config = StorageConfig {
            endpoint,
            use_ssl,
            bucket,
            credentials: StoreCredentials {
                access_key,
                secret_key,
            },
            presign_ttl,
            batch_deadline,
        };

        let warnings = validation::validate(&config)?;
        Ok(ConfigLoad { config, warnings })
    }
}

fn require(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigLoadError> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigLoadError::MissingVar(name))
}

fn resolve_secret_key(
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigLoadError> {
    if let Some(secret) = lookup(ENV_SECRET_KEY).filter(|value| !value.trim().is_empty()) {
        return Ok(secret.trim().to_string());
    }

    if let Some(path) = lookup(ENV_SECRET_KEY_FILE).filter(|value| !value.trim().is_empty()) {
        let path = path.trim().to_string();
        let secret = read_to_string(&path)
            .map_err(|source| ConfigLoadError::SecretFile {
                path: path.clone(),
                source,
            })?
            .trim()
            .to_string();
        if secret.is_empty() {
            return Err(ConfigLoadError::InvalidVar {
                name: ENV_SECRET_KEY_FILE,
                reason: format!("secret file {path} is empty"),
            });
        }
        return Ok(secret);
    }

    Err(ConfigLoadError::MissingVar(ENV_SECRET_KEY))
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigLoadError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigLoadError::InvalidVar {
            name,
            reason: format!("expected a boolean, got {other:?}"),
        }),
    }
}

fn parse_duration(name: &'static str, raw: &str) -> Result<Duration, ConfigLoadError> {
    humantime::parse_duration(raw.trim()).map_err(|err| ConfigLoadError::InvalidVar {
        name,
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            (ENV_ENDPOINT, "store.local:9000"),
            (ENV_BUCKET, "tracks"),
            (ENV_ACCESS_KEY, "opusbox"),
            (ENV_SECRET_KEY, "sekrit"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<ConfigLoad, ConfigLoadError> {
        ConfigLoader::load_with(|name| env.get(name).map(|value| value.to_string()))
    }

    #[test]
    fn minimal_environment_gets_documented_defaults() {
        let loaded = load(&base_env()).unwrap();

        assert_eq!(loaded.config.endpoint, "store.local:9000");
        assert_eq!(loaded.config.bucket, "tracks");
        assert!(!loaded.config.use_ssl);
        assert_eq!(loaded.config.presign_ttl, DEFAULT_PRESIGN_TTL);
        assert_eq!(loaded.config.batch_deadline, None);
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn durations_accept_humantime_forms() {
        let mut env = base_env();
        env.insert(ENV_PRESIGN_TTL, "90m");
        env.insert(ENV_BATCH_DEADLINE, "30s");

        let loaded = load(&env).unwrap();
        assert_eq!(loaded.config.presign_ttl, Duration::from_secs(90 * 60));
        assert_eq!(
            loaded.config.batch_deadline,
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn missing_secret_names_the_primary_variable() {
        let mut env = base_env();
        env.remove(ENV_SECRET_KEY);

        let err = load(&env).unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::MissingVar(name) if name == ENV_SECRET_KEY
        ));
    }

    #[test]
    fn secret_file_indirection_is_honored() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("opusbox-secret-{}", std::process::id()));
        std::fs::write(&path, "from-file\n").unwrap();

        let mut env = base_env();
        env.remove(ENV_SECRET_KEY);
        let path_str = path.to_string_lossy().into_owned();
        let loaded = ConfigLoader::load_with(|name| {
            if name == ENV_SECRET_KEY_FILE {
                Some(path_str.clone())
            } else {
                env.get(name).map(|value| value.to_string())
            }
        })
        .unwrap();

        assert_eq!(loaded.config.credentials.secret_key, "from-file");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn malformed_booleans_and_durations_are_rejected() {
        let mut env = base_env();
        env.insert(ENV_USE_SSL, "sometimes");
        assert!(matches!(
            load(&env),
            Err(ConfigLoadError::InvalidVar { name, .. }) if name == ENV_USE_SSL
        ));

        let mut env = base_env();
        env.insert(ENV_PRESIGN_TTL, "a fortnight-ish");
        assert!(matches!(
            load(&env),
            Err(ConfigLoadError::InvalidVar { name, .. }) if name == ENV_PRESIGN_TTL
        ));
    }

    #[test]
    fn guardrail_failures_propagate_through_the_loader() {
        let mut env = base_env();
        env.insert(ENV_BUCKET, "Tracks");
        assert!(matches!(load(&env), Err(ConfigLoadError::GuardRail(_))));
    }
}
