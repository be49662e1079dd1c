//! Configuration management for access requests.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::environment::{
    RequestsEnvironment, SequentialRequestIds, UuidRequestIds, DEFAULT_ID_PREFIX, DEFAULT_ID_START,
};
use crate::error::AccessError;
use crate::row_id::ITEM_SEPARATOR;
use crate::store::RequestStore;
use access_core::environment::{IdGenerator, SystemClock};
use access_runtime::StoreConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::sync::Arc;

/// How new request ids are minted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// `req-10001`, `req-10002`, ...
    #[default]
    Sequential,
    /// `req-<uuid v4>`
    Uuid,
}

impl FromStr for IdStrategy {
    type Err = AccessError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "uuid" => Ok(Self::Uuid),
            other => Err(AccessError::Config(format!(
                "ACCESS_REQUEST_ID_STRATEGY must be `sequential` or `uuid`, got `{other}`"
            ))),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Request id strategy (`ACCESS_REQUEST_ID_STRATEGY`)
    pub id_strategy: IdStrategy,
    /// Request id prefix (`ACCESS_REQUEST_ID_PREFIX`)
    pub id_prefix: String,
    /// Sequential counter start; the first id is one past it (`ACCESS_REQUEST_ID_START`)
    pub id_start: u64,
    /// Store feedback bound (`ACCESS_MAX_FEEDBACK_ACTIONS`)
    pub max_feedback_actions: usize,
    /// Log filter (`RUST_LOG`)
    pub log_level: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            id_strategy: IdStrategy::Sequential,
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            id_start: DEFAULT_ID_START,
            max_feedback_actions: StoreConfig::default().max_feedback_actions,
            log_level: "info".to_string(),
        }
    }
}

impl AccessConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Config`] for an unknown id strategy, a prefix
    /// containing `.`, or a zero feedback bound. Unparsable numbers fall back
    /// to their defaults.
    pub fn from_env() -> Result<Self, AccessError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AccessError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            id_strategy: lookup("ACCESS_REQUEST_ID_STRATEGY")
                .map(|s| s.parse::<IdStrategy>())
                .transpose()?
                .unwrap_or(defaults.id_strategy),
            id_prefix: lookup("ACCESS_REQUEST_ID_PREFIX").unwrap_or(defaults.id_prefix),
            id_start: lookup("ACCESS_REQUEST_ID_START")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.id_start),
            max_feedback_actions: lookup("ACCESS_MAX_FEEDBACK_ACTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_feedback_actions),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make the store unusable
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<(), AccessError> {
        if self.id_prefix.contains(ITEM_SEPARATOR) {
            return Err(AccessError::Config(format!(
                "ACCESS_REQUEST_ID_PREFIX must not contain `{ITEM_SEPARATOR}`, got `{}`",
                self.id_prefix
            )));
        }
        if self.max_feedback_actions == 0 {
            return Err(AccessError::Config(
                "ACCESS_MAX_FEEDBACK_ACTIONS must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Runtime configuration for the request store
    #[must_use]
    pub const fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.max_feedback_actions)
    }

    /// Production environment for the configured id strategy
    #[must_use]
    pub fn build_environment(&self) -> RequestsEnvironment {
        let ids: Arc<dyn IdGenerator> = match self.id_strategy {
            IdStrategy::Sequential => Arc::new(SequentialRequestIds::new(self.id_prefix.clone(), self.id_start)),
            IdStrategy::Uuid => Arc::new(UuidRequestIds::new(self.id_prefix.clone())),
        };
        RequestsEnvironment::new(Arc::new(SystemClock), ids)
    }

    /// Empty request store wired from this configuration
    #[must_use]
    pub fn build_store(&self) -> RequestStore {
        RequestStore::with_config(self.build_environment(), self.store_config())
    }
}
