//! Configuration for tk-erp
//!
//! Stored in .erp/config.toml

use crate::id::DocumentKind;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// tk-erp configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data file name inside .erp/
    pub data_file: String,

    /// Document number prefixes
    #[serde(default)]
    pub prefixes: PrefixConfig,

    /// Document number allocation
    #[serde(default)]
    pub allocation: AllocationConfig,

    /// Display settings
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: "data.json".to_string(),
            prefixes: PrefixConfig::default(),
            allocation: AllocationConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

/// Prefix per document type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefixConfig {
    pub requisition: String,
    pub rfq: String,
    pub purchase_order: String,
}

impl Default for PrefixConfig {
    fn default() -> Self {
        Self {
            requisition: DocumentKind::PurchaseRequisition.default_prefix().to_string(),
            rfq: DocumentKind::Rfq.default_prefix().to_string(),
            purchase_order: DocumentKind::PurchaseOrder.default_prefix().to_string(),
        }
    }
}

impl PrefixConfig {
    pub fn prefix(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::PurchaseRequisition => &self.requisition,
            DocumentKind::Rfq => &self.rfq,
            DocumentKind::PurchaseOrder => &self.purchase_order,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AllocationConfig {
    /// Hand out sequence 1 when the store cannot be read instead of failing
    pub fallback_on_storage_error: bool,
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use colors in output
    pub colors: bool,

    /// Date format for display
    pub date_format: String,

    /// Maximum name length before truncation
    pub max_name_length: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            colors: true,
            date_format: "%d/%m/%Y".to_string(),
            max_name_length: 40,
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("{}: {}", path.display(), e)))?;
        config
            .validate()
            .map_err(|e| crate::Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Check values serde cannot check on its own
    pub fn validate(&self) -> Result<(), String> {
        let format = &self.display.date_format;
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(format!("invalid display.date_format {:?}", format));
        }
        Ok(())
    }

    /// Save config to a TOML file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Generate a default config file with comments
    pub fn default_with_comments() -> String {
        r#"# tk-erp configuration

# Data file inside .erp/
data_file = "data.json"

[prefixes]
# Document number prefixes: PREFIX-YYYYMMDD-NNN
requisition = "PR"
rfq = "RFQ"
purchase_order = "PO"

[allocation]
# When the data file cannot be read, hand out sequence 001 instead of failing
fallback_on_storage_error = false

[display]
# Use colors in output
colors = true

# Date format for display (strftime format)
date_format = "%d/%m/%Y"

# Maximum name length before truncation
max_name_length = 40
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commented_template_matches_defaults() {
        let parsed: Config = toml::from_str(&Config::default_with_comments()).unwrap();
        let defaults = Config::default();
        assert_eq!(parsed.data_file, defaults.data_file);
        assert_eq!(parsed.prefixes.rfq, "RFQ");
        assert!(!parsed.allocation.fallback_on_storage_error);
        assert_eq!(parsed.display.max_name_length, defaults.display.max_name_length);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: Config = toml::from_str("[prefixes]\nrequisition = \"YC\"\n").unwrap();
        assert_eq!(parsed.prefixes.prefix(DocumentKind::PurchaseRequisition), "YC");
        assert_eq!(parsed.prefixes.prefix(DocumentKind::PurchaseOrder), "PO");
        assert_eq!(parsed.data_file, "data.json");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.allocation.fallback_on_storage_error = true;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert!(loaded.allocation.fallback_on_storage_error);
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "data_file = [").unwrap();
        assert!(matches!(Config::load(&path), Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_invalid_date_format_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[display]\ndate_format = \"%Q\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(crate::Error::Config(_))));

        std::fs::write(&path, "[display]\ndate_format = \"%Y-%m-%d\"\n").unwrap();
        assert_eq!(Config::load(&path).unwrap().display.date_format, "%Y-%m-%d");
    }
}
