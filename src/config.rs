// Session-wide constants: load latency, debounce interval, paging and slider bounds

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

// Front end configuration options
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExpoConfig {
    pub load_latency_ms: u64,
    pub load_jitter_ms: u64,
    pub search_debounce_ms: u64,
    pub review_page_size: usize,
    pub max_price_ceiling: u32,
    pub rating_ceiling: f64,
}

impl Default for ExpoConfig {
    fn default() -> Self {
        Self {
            load_latency_ms: 800,
            load_jitter_ms: 0,
            search_debounce_ms: 400,
            review_page_size: 2,
            max_price_ceiling: 20000,
            rating_ceiling: 5.0,
        }
    }
}

impl ExpoConfig {
    // Missing keys fall back to the defaults above
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ExpoConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.review_page_size == 0 {
            return Err(ConfigError::Invalid(
                "review_page_size must be positive".to_string(),
            ));
        }

        if !(self.rating_ceiling > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "rating_ceiling must be positive, got {}",
                self.rating_ceiling
            )));
        }

        Ok(())
    }

    pub fn search_debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.search_debounce_ms)
    }
}
