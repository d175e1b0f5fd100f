//! Panel configuration.
//!
//! Loaded from TOML. Every field has a default, so a partial file (or none
//! at all) is valid:
//!
//! ```toml
//! [labels]
//! trigger_text = "More filters"
//!
//! [row]
//! spacing = 8.0
//! trigger_width = 120.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use filterbar_core::logging::targets;

use crate::error::{Error, Result};
use crate::measure::RowMetrics;

/// Texts shown on the overflow trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerLabels {
    /// Label of the trigger itself.
    pub trigger_text: String,
    /// Tooltip when no overflowed filter holds a value.
    pub no_applied_filters: String,
    /// Tooltip prefix before the joined names of applied overflowed filters.
    pub applied_filters_prefix: String,
}

impl Default for TriggerLabels {
    fn default() -> Self {
        Self {
            trigger_text: "More filters".to_string(),
            no_applied_filters: "No applied filters".to_string(),
            applied_filters_prefix: "Applied filters: ".to_string(),
        }
    }
}

impl TriggerLabels {
    /// Tooltip summarizing the given applied filter names.
    pub fn tooltip<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> String {
        let names: Vec<&str> = names.into_iter().collect();
        if names.is_empty() {
            self.no_applied_filters.clone()
        } else {
            format!("{}{}", self.applied_filters_prefix, names.join(", "))
        }
    }
}

/// Configuration of a filter panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub labels: TriggerLabels,
    pub row: RowMetrics,
}

impl PanelConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(target: targets::CONFIG, path = %path.display(), "loaded panel configuration");
        Ok(config)
    }
}
