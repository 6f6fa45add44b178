//! Configuration loading and validation for named encryption drivers.
//!
//! Values are read from `ENCRYPTION__*` environment variables, nested with
//! `__`:
//!
//! ```text
//! ENCRYPTION__DEFAULT=app
//! ENCRYPTION__DRIVERS__APP__DRIVER=aes_256_gcm
//! ENCRYPTION__DRIVERS__APP__ID=app
//! ENCRYPTION__DRIVERS__APP__KEYS=newest-secret-value,older-secret-value
//! ```
//!
//! Validation builds every configured driver once, so a bad key or id fails
//! at load time rather than on first use.

use std::collections::HashMap;
use std::fmt;

use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::{Deserialize, Deserializer};

use crate::drivers::{Driver, DriverConfig, DriverKind};
use crate::error::EncryptionError;

/// Validated configuration for an [`EncryptionManager`](crate::EncryptionManager).
#[derive(Debug, Clone, Deserialize)]
pub struct EncryptionConfig {
    /// Name of the driver used when none is requested.
    #[serde(default)]
    pub default: Option<String>,

    /// Tracing log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Named driver entries.
    #[serde(default)]
    pub drivers: HashMap<String, DriverEntry>,
}

/// One named driver: its construction, id and key ring.
#[derive(Clone, Deserialize)]
pub struct DriverEntry {
    /// Which construction to use.
    pub driver: DriverKind,

    /// Driver id. Required by every driver except `legacy`.
    #[serde(default)]
    pub id: Option<String>,

    /// Ordered secrets, newest first. Accepts a list or a comma-separated
    /// string.
    #[serde(deserialize_with = "deserialize_keys")]
    pub keys: Vec<String>,
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KeysRepr {
    List(Vec<String>),
    Csv(String),
}

fn deserialize_keys<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match KeysRepr::deserialize(deserializer)? {
        KeysRepr::List(keys) => keys,
        KeysRepr::Csv(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_owned)
            .collect(),
    })
}

impl DriverEntry {
    /// Entry for `kind` with the given keys and no id.
    pub fn new<S: Into<String>>(kind: DriverKind, keys: impl IntoIterator<Item = S>) -> Self {
        Self {
            driver: kind,
            id: None,
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Set the driver id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The single-driver construction input for this entry.
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            id: self.id.clone(),
            keys: self.keys.clone(),
        }
    }
}

impl fmt::Debug for DriverEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverEntry")
            .field("driver", &self.driver)
            .field("id", &self.id)
            .field("keys", &format_args!("[REDACTED; {}]", self.keys.len()))
            .finish()
    }
}

impl EncryptionConfig {
    /// Load and validate configuration from `ENCRYPTION__*` variables.
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::Config`] if the variables cannot be read,
    /// or any error [`validate`](Self::validate) reports.
    pub fn from_env() -> Result<Self, EncryptionError> {
        Self::load(
            config::Config::builder().add_source(
                config::Environment::with_prefix("ENCRYPTION")
                    .prefix_separator("__")
                    .separator("__"),
            ),
        )
    }

    /// Build, deserialize and validate from an arbitrary builder.
    pub fn load(builder: ConfigBuilder<DefaultState>) -> Result<Self, EncryptionError> {
        let c: EncryptionConfig = builder.build()?.try_deserialize()?;
        c.validate()?;
        Ok(c)
    }

    /// Check every entry the way the drivers check it at construction, and
    /// that the default names a configured entry.
    ///
    /// # Errors
    ///
    /// Returns the first key or id error, prefixed with the entry name, or a
    /// [`EncryptionError::Config`] for a dangling default.
    pub fn validate(&self) -> Result<(), EncryptionError> {
        for (name, entry) in &self.drivers {
            Driver::new(entry.driver, &entry.driver_config())
                .map_err(|e| EncryptionError::Config(format!("driver {name:?}: {e}")))?;
        }
        if let Some(default) = &self.default {
            if !self.drivers.contains_key(default) {
                return Err(EncryptionError::Config(format!(
                    "default driver {default:?} is not configured"
                )));
            }
        }
        if self.log_level.trim().is_empty() {
            return Err(EncryptionError::Config("log_level must not be empty".into()));
        }
        Ok(())
    }
}
