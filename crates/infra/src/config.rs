//! Runtime settings.
//!
//! Settings are read once per operation by the caller and passed down
//! explicitly; nothing in the engines holds global configuration.

use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tally_invoicing::DocumentType;
use tally_numbering::{NumberingPolicy, NumberingScheme};

/// Environment variable prefix, e.g. `TALLY__STOCK_TRACKING_ENABLED=true`.
pub const ENV_PREFIX: &str = "TALLY";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// When off, invoices neither check nor consume stock.
    pub stock_tracking_enabled: bool,
    /// Display only; amounts carry no currency.
    pub currency: String,
    pub invoice_numbering: NumberingScheme,
    pub purchase_order_numbering: NumberingScheme,
    pub movement_numbering: NumberingScheme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            stock_tracking_enabled: false,
            currency: "XOF".to_string(),
            invoice_numbering: NumberingScheme::prefix_increment("FAC"),
            purchase_order_numbering: NumberingScheme::prefix_increment("BC"),
            movement_numbering: NumberingScheme::prefix_increment("FS"),
        }
    }
}

impl Settings {
    /// Defaults, then the optional file, then `TALLY__*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn numbering_for(&self, document_type: DocumentType) -> &NumberingScheme {
        match document_type {
            DocumentType::Invoice => &self.invoice_numbering,
            DocumentType::PurchaseOrder => &self.purchase_order_numbering,
        }
    }

    /// Movement numbers are always prefix-increment; only the configured
    /// prefix and step are honoured.
    pub fn movement_scheme(&self) -> NumberingScheme {
        NumberingScheme::new(
            NumberingPolicy::PrefixIncrement,
            self.movement_numbering.prefix.clone(),
            self.movement_numbering.step,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::DocumentId;

    #[test]
    fn defaults_disable_tracking_and_use_distinct_prefixes() {
        let settings = Settings::default();

        assert!(!settings.stock_tracking_enabled);
        assert_eq!(settings.numbering_for(DocumentType::Invoice).prefix, "FAC");
        assert_eq!(settings.numbering_for(DocumentType::PurchaseOrder).prefix, "BC");
        assert_eq!(settings.movement_numbering.prefix, "FS");
    }

    #[test]
    fn file_overrides_defaults_and_keeps_the_rest() {
        let path = std::env::temp_dir().join(format!("tally-settings-{}.json", DocumentId::new()));
        std::fs::write(
            &path,
            r#"{
                "stock_tracking_enabled": true,
                "invoice_numbering": { "policy": "year-prefix", "prefix": "INV", "step": 2 }
            }"#,
        )
        .unwrap();

        let settings = Settings::load(Some(path.as_path())).unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(settings.stock_tracking_enabled);
        assert_eq!(
            settings.invoice_numbering,
            NumberingScheme::new(NumberingPolicy::YearPrefix, "INV", 2)
        );
        assert_eq!(settings.currency, "XOF");
        assert_eq!(settings.movement_numbering.prefix, "FS");
    }

    #[test]
    fn movement_numbering_ignores_the_configured_policy() {
        let settings = Settings {
            movement_numbering: NumberingScheme::new(NumberingPolicy::DateRandom, "MV", 5),
            ..Settings::default()
        };

        assert_eq!(
            settings.movement_scheme(),
            NumberingScheme::new(NumberingPolicy::PrefixIncrement, "MV", 5)
        );
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("tally-missing-{}.toml", DocumentId::new()));

        let settings = Settings::load(Some(path.as_path())).unwrap();
        assert_eq!(settings.invoice_numbering.prefix, "FAC");
    }
}
