//! [`EncryptionManager`]: named, lazily-built [`Encryption`] instances.
//!
//! Each name maps to a factory. The first `use_driver(name)` runs the factory
//! and caches the result; later calls return the same `Arc`. The cache is an
//! [`ArcSwap`] map so lookups on the hot path never take a lock.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::config::EncryptionConfig;
use crate::drivers::EncryptionDriverExt;
use crate::encryption::Encryption;
use crate::error::EncryptionError;
use crate::message::EncryptOptions;
use crate::message_verifier::MessageVerifier;

type Factory = Box<dyn Fn() -> Result<Encryption, EncryptionError> + Send + Sync>;

/// Registry of named encryption instances with an optional default.
pub struct EncryptionManager {
    default: Option<String>,
    factories: HashMap<String, Factory>,
    cache: ArcSwap<HashMap<String, Arc<Encryption>>>,
}

impl EncryptionManager {
    /// Create an empty manager with no default.
    pub fn new() -> Self {
        Self {
            default: None,
            factories: HashMap::new(),
            cache: ArcSwap::new(Arc::new(HashMap::new())),
        }
    }

    /// Name the driver used when `use_driver(None)` is called.
    pub fn with_default(mut self, name: impl Into<String>) -> Self {
        self.default = Some(name.into());
        self
    }

    /// Register a factory under `name`. Replaces any earlier registration.
    pub fn register<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Encryption, EncryptionError> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    /// One factory per configured driver, with the configured default.
    ///
    /// # Errors
    ///
    /// Returns any error [`EncryptionConfig::validate`] reports.
    pub fn from_config(config: &EncryptionConfig) -> Result<Self, EncryptionError> {
        config.validate()?;

        let mut manager = Self::new();
        manager.default = config.default.clone();
        for (name, entry) in &config.drivers {
            let entry = entry.clone();
            manager = manager.register(name.clone(), move || {
                Encryption::with_driver(entry.driver, entry.id.as_deref(), &entry.keys)
            });
        }

        debug!(
            drivers = config.drivers.len(),
            default = config.default.as_deref().unwrap_or(""),
            "encryption manager created"
        );
        Ok(manager)
    }

    /// Name of the default driver, if any.
    pub fn default_name(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Number of instances built so far.
    pub fn cached(&self) -> usize {
        self.cache.load().len()
    }

    /// Return the instance for `name`, or the default when `name` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::NoDefaultDriver`] when `name` is `None` and
    /// no default is set, [`EncryptionError::UnknownDriver`] for an
    /// unregistered name, or the factory's error.
    pub fn use_driver(&self, name: Option<&str>) -> Result<Arc<Encryption>, EncryptionError> {
        let name = match name {
            Some(name) => name,
            None => self
                .default
                .as_deref()
                .ok_or(EncryptionError::NoDefaultDriver)?,
        };

        if let Some(cached) = self.cache.load().get(name) {
            debug!(driver = name, "encryption cache hit");
            return Ok(Arc::clone(cached));
        }

        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| EncryptionError::UnknownDriver(name.to_owned()))?;
        let built = Arc::new(factory()?);

        // A concurrent caller may have won the race; keep whichever landed first.
        self.cache.rcu(|current| {
            let mut next = HashMap::clone(current);
            next.entry(name.to_owned())
                .or_insert_with(|| Arc::clone(&built));
            next
        });
        debug!(driver = name, "encryption instance cached");

        Ok(self
            .cache
            .load()
            .get(name)
            .map(Arc::clone)
            .unwrap_or(built))
    }

    /// Encrypt with the default driver.
    pub fn encrypt<T: Serialize + ?Sized>(
        &self,
        payload: &T,
        options: &EncryptOptions,
    ) -> Result<String, EncryptionError> {
        self.use_driver(None)?.encrypt(payload, options)
    }

    /// Decrypt with the default driver. `Err` only for a missing default or a
    /// factory failure; an invalid token is `Ok(None)`.
    pub fn decrypt<T: DeserializeOwned>(
        &self,
        token: &str,
        purpose: Option<&str>,
    ) -> Result<Option<T>, EncryptionError> {
        Ok(self.use_driver(None)?.decrypt(token, purpose))
    }

    /// Message verifier of the default driver.
    pub fn message_verifier(&self) -> Result<MessageVerifier, EncryptionError> {
        Ok(self.use_driver(None)?.message_verifier().clone())
    }
}

impl Default for EncryptionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EncryptionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("EncryptionManager")
            .field("default", &self.default)
            .field("drivers", &names)
            .field("cached", &self.cached())
            .finish()
    }
}
