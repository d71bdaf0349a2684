use crate::error::{MetricsError, Result};
use crate::normalization::VatTreatment;
use crate::schema::MarketConfig;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportOptions {
    #[serde(default)]
    #[schemars(description = "Whether revenue is reported with VAT removed (default) or as recorded")]
    pub vat: VatTreatment,

    #[serde(default)]
    #[schemars(description = "Include per-channel new-customer order counts in channel rows")]
    pub include_channel_order_counts: bool,

    #[serde(default)]
    #[schemars(description = "Restrict the report to these market codes. All configured markets when omitted.")]
    pub markets: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EngineConfig {
    #[schemars(description = "ISO code of the currency all amounts are reported in (e.g. 'EUR')")]
    pub reporting_currency: String,

    #[schemars(description = "Every market the engine reports on")]
    pub markets: Vec<MarketConfig>,

    #[serde(default)]
    #[schemars(description = "Options applied when a request does not override them")]
    pub default_options: ReportOptions,
}

impl EngineConfig {
    pub fn new(reporting_currency: impl Into<String>, markets: Vec<MarketConfig>) -> Result<Self> {
        let config = Self {
            reporting_currency: reporting_currency.into(),
            markets,
            default_options: ReportOptions::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        debug!(
            "Loaded configuration with {} markets reporting in {}",
            config.markets.len(),
            config.reporting_currency
        );
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for market in &self.markets {
            if market.code.trim().is_empty() {
                return Err(MetricsError::InvalidMarketConfig {
                    market: market.name.clone(),
                    details: "Market code must not be empty".to_string(),
                });
            }

            if !seen.insert(market.code.as_str()) {
                return Err(MetricsError::DuplicateMarket(market.code.clone()));
            }

            if !market.currency_multiplier.is_finite() || market.currency_multiplier <= 0.0 {
                return Err(MetricsError::InvalidMarketConfig {
                    market: market.code.clone(),
                    details: format!(
                        "Currency multiplier {} must be a positive number",
                        market.currency_multiplier
                    ),
                });
            }

            if !(0.0..1.0).contains(&market.vat_rate) {
                return Err(MetricsError::InvalidMarketConfig {
                    market: market.code.clone(),
                    details: format!(
                        "VAT rate {} must be a fraction between 0.0 and 1.0",
                        market.vat_rate
                    ),
                });
            }
        }

        Ok(())
    }

    pub fn market(&self, code: &str) -> Result<&MarketConfig> {
        self.markets
            .iter()
            .find(|m| m.code == code)
            .ok_or_else(|| MetricsError::UnknownMarket(code.to_string()))
    }

    /// The markets selected by `options`, in configuration order unless a selection is given.
    ///
    /// A code listed twice is rejected rather than counted twice.
    pub fn selected_markets(&self, options: &ReportOptions) -> Result<Vec<&MarketConfig>> {
        let Some(codes) = &options.markets else {
            return Ok(self.markets.iter().collect());
        };

        let mut seen = HashSet::new();
        codes
            .iter()
            .map(|code| {
                if !seen.insert(code.as_str()) {
                    return Err(MetricsError::DuplicateMarket(code.clone()));
                }
                self.market(code)
            })
            .collect()
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(EngineConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
