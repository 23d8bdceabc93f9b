//! Runtime configuration
//!
//! Values come from three layers, later layers overriding earlier ones:
//! built-in defaults, a TOML file, then `DPF_*` environment variables.
//!
//! ```toml
//! grace_window_secs = 259200
//! proof_timeout_ms = 2000
//! record_timeout_ms = 5000
//! max_proof_bytes = 65536
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::errors::{DpfError, Result};

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "DPF_";

/// How long a replaced root keeps authorizing interactions: 72 hours.
pub const DEFAULT_GRACE_WINDOW_SECS: u64 = 72 * 60 * 60;

pub const DEFAULT_PROOF_TIMEOUT_MS: u64 = 2_000;
pub const DEFAULT_RECORD_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_MAX_PROOF_BYTES: usize = 64 * 1024;

/// Settings shared by the evaluator, the registry and the record adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DpfConfig {
    /// Period after a root rotation during which the previous root still counts
    pub grace_window_secs: u64,
    /// Upper bound on each membership-proof fetch
    pub proof_timeout_ms: u64,
    /// Upper bound on each DNS TXT lookup
    pub record_timeout_ms: u64,
    /// Largest encoded proof accepted from a proof source
    pub max_proof_bytes: usize,
}

impl Default for DpfConfig {
    fn default() -> Self {
        Self {
            grace_window_secs: DEFAULT_GRACE_WINDOW_SECS,
            proof_timeout_ms: DEFAULT_PROOF_TIMEOUT_MS,
            record_timeout_ms: DEFAULT_RECORD_TIMEOUT_MS,
            max_proof_bytes: DEFAULT_MAX_PROOF_BYTES,
        }
    }
}

impl DpfConfig {
    pub fn grace_window(&self) -> Duration {
        Duration::from_secs(self.grace_window_secs)
    }

    pub fn proof_timeout(&self) -> Duration {
        Duration::from_millis(self.proof_timeout_ms)
    }

    pub fn record_timeout(&self) -> Duration {
        Duration::from_millis(self.record_timeout_ms)
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: DpfConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DpfError::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply `DPF_*` overrides from the process environment.
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply overrides from `(name, value)` pairs; names without the
    /// [`ENV_PREFIX`] are ignored, unknown prefixed names are rejected.
    pub fn merge_with_vars<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match name.to_ascii_lowercase().as_str() {
                "grace_window_secs" => self.grace_window_secs = parse_var(&key, &value)?,
                "proof_timeout_ms" => self.proof_timeout_ms = parse_var(&key, &value)?,
                "record_timeout_ms" => self.record_timeout_ms = parse_var(&key, &value)?,
                "max_proof_bytes" => self.max_proof_bytes = parse_var(&key, &value)?,
                _ => {
                    return Err(DpfError::config(format!(
                        "unknown configuration variable {key}"
                    )))
                }
            }
            tracing::debug!(variable = %key, "applied configuration override");
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.grace_window_secs == 0 {
            return Err(DpfError::config("grace_window_secs must be positive"));
        }
        if self.proof_timeout_ms == 0 {
            return Err(DpfError::config("proof_timeout_ms must be positive"));
        }
        if self.record_timeout_ms == 0 {
            return Err(DpfError::config("record_timeout_ms must be positive"));
        }
        if self.max_proof_bytes == 0 {
            return Err(DpfError::config("max_proof_bytes must be positive"));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| DpfError::config(format!("{key}={value:?} is not a valid number")))
}
