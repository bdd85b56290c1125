use std::sync::{Arc, RwLock};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::config::DefaultsCfg;

/// Closed set of chat backends a session can be configured against.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    OpenRouter,
    Custom,
}

/// Model identifier a fresh store starts with.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// One live configuration record: which backend, which model, and the
/// credential to present. The credential is held in memory only;
/// `SecretString` redacts Debug output and is never serialized.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider: Provider,
    pub model: String,
    pub credential: SecretString,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: Provider::OpenAi,
            model: DEFAULT_MODEL.to_string(),
            credential: SecretString::new("".into()),
        }
    }
}

/// Shared handle to the current configuration record.
///
/// Clones are cheap and all point at the same record; the store lives exactly
/// as long as its clones do, and there is no process-wide instance. Any holder
/// may write; readers always see either the old record or the new one in
/// full, never a mix.
#[derive(Clone, Default)]
pub struct ProviderStore {
    inner: Arc<RwLock<ProviderConfig>>,
}

impl ProviderStore {
    /// A store holding the fixed default record.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with `config` instead of the defaults.
    pub fn with_config(config: ProviderConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Seed from file configuration: provider and model from `defaults`,
    /// credential empty until a caller sets one.
    pub fn from_defaults(defaults: &DefaultsCfg) -> Self {
        Self::with_config(ProviderConfig {
            provider: defaults.provider,
            model: defaults.model.clone(),
            credential: SecretString::new("".into()),
        })
    }

    /// Snapshot of the current record.
    pub fn get(&self) -> ProviderConfig {
        // A poisoned lock still holds a fully-replaced record; recover it.
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.clone()
    }

    /// Replace the record wholesale. No validation, no field merging; the
    /// last writer wins.
    pub fn set(&self, config: ProviderConfig) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = config;
    }
}
