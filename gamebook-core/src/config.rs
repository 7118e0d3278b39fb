//! Session configuration
use serde::{Deserialize, Serialize};

use crate::autosave::DEFAULT_AUTOSAVE_DELAY_MS;
use crate::storage::DEFAULT_STORAGE_KEY;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Storage key the sheet autosaves under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default = "default_autosave_delay_ms")]
    pub autosave_delay_ms: u64,
    /// Fixed dice seed; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

const fn default_autosave_delay_ms() -> u64 {
    DEFAULT_AUTOSAVE_DELAY_MS
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            autosave_delay_ms: default_autosave_delay_ms(),
            seed: None,
        }
    }
}

impl SheetConfig {
    /// Load configuration from JSON text; absent fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        if seed.is_some() {
            self.seed = seed;
        }
        self
    }
}
