use crate::core::{MatcherConfig, RankingConfig, ShortlistConfig};
use crate::error::WeightsError;
use crate::models::ScoringWeights;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub explainer: ExplainerSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExplainerSettings {
    #[serde(default = "default_explainer_endpoint")]
    pub endpoint: String,
    /// Empty disables explanations; every entry gets the placeholder text
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_explainer_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for ExplainerSettings {
    fn default() -> Self {
        Self {
            endpoint: default_explainer_endpoint(),
            api_key: String::new(),
            model: default_explainer_model(),
            temperature: default_temperature(),
        }
    }
}

fn default_explainer_endpoint() -> String { "https://api.openai.com/v1".to_string() }
fn default_explainer_model() -> String { "gpt-4o-mini".to_string() }
fn default_temperature() -> f64 { 0.3 }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_max_top_n")]
    pub max_top_n: usize,
    #[serde(default = "default_explanation_timeout_secs")]
    pub explanation_timeout_secs: u64,
    #[serde(default = "default_distance_scale_km")]
    pub distance_scale_km: f64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            max_top_n: default_max_top_n(),
            explanation_timeout_secs: default_explanation_timeout_secs(),
            distance_scale_km: default_distance_scale_km(),
        }
    }
}

fn default_top_n() -> usize { 5 }
fn default_max_top_n() -> usize { 50 }
fn default_explanation_timeout_secs() -> u64 { 20 }
fn default_distance_scale_km() -> f64 { 25.0 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_distance_weight")]
    pub distance: f64,
    /// Placement-partner business priority; must stay the largest weight
    #[serde(default = "default_partner_weight")]
    pub partner: f64,
    #[serde(default = "default_amenity_weight")]
    pub amenity: f64,
    #[serde(default = "default_budget_weight")]
    pub budget: f64,
    #[serde(default = "default_contract_weight")]
    pub contract: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            distance: default_distance_weight(),
            partner: default_partner_weight(),
            amenity: default_amenity_weight(),
            budget: default_budget_weight(),
            contract: default_contract_weight(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        Self {
            distance: config.distance,
            partner: config.partner,
            amenity: config.amenity,
            budget: config.budget,
            contract: config.contract,
        }
    }
}

fn default_distance_weight() -> f64 { 0.25 }
fn default_partner_weight() -> f64 { 0.35 }
fn default_amenity_weight() -> f64 { 0.20 }
fn default_budget_weight() -> f64 { 0.15 }
fn default_contract_weight() -> f64 { 0.05 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with PLACEMENT_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .add_source(File::with_name("config/default").required(false))
            // Local overrides for development
            .add_source(File::with_name("config/local").required(false))
            // e.g., PLACEMENT__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("PLACEMENT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("PLACEMENT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Build the validated run configuration for the matcher
    pub fn matcher_config(&self) -> Result<MatcherConfig, WeightsError> {
        let weights = ScoringWeights::from(&self.scoring.weights);
        weights.validate()?;

        Ok(MatcherConfig {
            ranking: RankingConfig {
                weights,
                distance_scale_km: self.matching.distance_scale_km,
            },
            shortlist: ShortlistConfig {
                top_n: self.matching.top_n.clamp(1, self.matching.max_top_n.max(1)),
                max_top_n: self.matching.max_top_n.max(1),
                explanation_timeout: Duration::from_secs(self.matching.explanation_timeout_secs),
            },
        })
    }
}

/// Pick up the explanation API key from the conventional variable
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let api_key = env::var("PLACEMENT__EXPLAINER__API_KEY")
        .or_else(|_| env::var("OPENAI_API_KEY"))
        .ok();

    let mut builder = Config::builder().add_source(settings);
    if let Some(api_key) = api_key {
        builder = builder.set_override("explainer.api_key", api_key)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = WeightsConfig::default();
        assert_eq!(weights.distance, 0.25);
        assert_eq!(weights.partner, 0.35);
        assert_eq!(weights.amenity, 0.20);
        assert_eq!(weights.budget, 0.15);
        assert_eq!(weights.contract, 0.05);
        assert_eq!(ScoringWeights::from(&weights), ScoringWeights::default());
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_weights_from_toml_partial() {
        let weights: WeightsConfig = toml::from_str("partner = 0.5\ndistance = 0.3").unwrap();
        assert_eq!(weights.partner, 0.5);
        assert_eq!(weights.distance, 0.3);
        assert_eq!(weights.amenity, 0.20);
    }

    fn settings_with_weights(weights: WeightsConfig) -> Settings {
        Settings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8080,
                workers: None,
            },
            explainer: ExplainerSettings::default(),
            matching: MatchingSettings::default(),
            scoring: ScoringSettings { weights },
            logging: LoggingSettings::default(),
        }
    }

    #[test]
    fn test_matcher_config_from_defaults() {
        let config = settings_with_weights(WeightsConfig::default())
            .matcher_config()
            .unwrap();

        assert_eq!(config.shortlist.top_n, 5);
        assert_eq!(config.shortlist.max_top_n, 50);
        assert_eq!(config.shortlist.explanation_timeout, Duration::from_secs(20));
        assert_eq!(config.ranking.distance_scale_km, 25.0);
    }

    #[test]
    fn test_matcher_config_rejects_demoted_partner() {
        let weights = WeightsConfig {
            partner: 0.1,
            ..WeightsConfig::default()
        };
        let result = settings_with_weights(weights).matcher_config();

        assert!(matches!(result, Err(WeightsError::PartnerNotDominant { .. })));
    }
}
