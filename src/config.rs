use chrono_tz::Tz;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::errors::ConfigError;
use crate::model::Timeframe;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(deserialize_with = "secret_from_string")]
    pub fred_api_key: SecretString,
    #[serde(deserialize_with = "secret_from_string")]
    pub groq_api_key: SecretString,
    pub fred_base_url: String,
    pub candle_base_url: String,
    pub venue: String,
    /// Instrument symbols the venue lists under another name.
    pub symbol_aliases: BTreeMap<String, String>,
    pub bar_limit: u32,
    pub timezone: String,
    pub bar_caps: BTreeMap<Timeframe, usize>,
    pub inference_url: String,
    pub model: String,
    pub temperature: f64,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_factor: u32,
    pub translate_url: String,
    pub source_language: String,
    pub target_language: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fred_api_key: SecretString::from(String::new()),
            groq_api_key: SecretString::from(String::new()),
            fred_base_url: "https://api.stlouisfed.org/fred/series/observations".into(),
            candle_base_url: "https://api.binance.com/api/v3/klines".into(),
            venue: "BINANCE".into(),
            symbol_aliases: BTreeMap::from([("XAUUSD".to_string(), "PAXGUSDT".to_string())]),
            bar_limit: 100,
            timezone: "UTC".into(),
            bar_caps: Timeframe::ALL
                .iter()
                .map(|tf| (*tf, tf.default_bar_cap()))
                .collect(),
            inference_url: "https://api.groq.com/openai/v1/chat/completions".into(),
            model: "llama3-70b-8192".into(),
            temperature: 0.7,
            request_timeout_secs: 90,
            max_retries: 3,
            backoff_factor: 2,
            translate_url: "https://translate.googleapis.com/translate_a/single".into(),
            source_language: "en".into(),
            target_language: "zh-TW".into(),
        }
    }
}

impl AppConfig {
    /// Prompt cap for a timeframe, falling back to the built-in table.
    pub fn bar_cap(&self, timeframe: Timeframe) -> usize {
        self.bar_caps
            .get(&timeframe)
            .copied()
            .unwrap_or_else(|| timeframe.default_bar_cap())
    }

    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimezone(self.timezone.clone()))
    }

    /// Overlays credentials and the model name from the environment.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("FRED_API_KEY") {
            self.fred_api_key = SecretString::from(key);
        }
        if let Some(key) = lookup("GROQ_API_KEY") {
            self.groq_api_key = SecretString::from(key);
        }
        if let Some(model) = lookup("FX_SNIPER_MODEL").filter(|m| !m.trim().is_empty()) {
            self.model = model;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.tz()?;
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid("max_retries must be at least 1".into()));
        }
        if self.bar_limit == 0 {
            return Err(ConfigError::Invalid("bar_limit must be at least 1".into()));
        }
        Ok(())
    }
}

fn secret_from_string<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

/// Loads the config file (if any), then applies environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            serde_json::from_str::<AppConfig>(&content)?
        }
        None => AppConfig::default(),
    };
    config.apply_env(|name| std::env::var(name).ok());
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_match_reference_deployment() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.bar_cap(Timeframe::FifteenMinutes), 30);
        assert_eq!(cfg.request_timeout_secs, 90);
        assert_eq!(cfg.max_retries, 3);
        assert_eq!(cfg.backoff_factor, 2);
        assert!(cfg.groq_api_key.expose_secret().is_empty());
    }

    #[test]
    fn default_instrument_maps_to_a_listed_venue_symbol() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.venue, "BINANCE");
        assert_eq!(cfg.symbol_aliases.get("XAUUSD").map(String::as_str), Some("PAXGUSDT"));
    }

    #[test]
    fn file_aliases_replace_the_default_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"symbol_aliases": {{"EURUSD": "EURUSDT"}}}}"#).unwrap();

        let cfg = load_config(Some(file.path())).unwrap();
        assert_eq!(cfg.symbol_aliases.len(), 1);
        assert_eq!(cfg.symbol_aliases["EURUSD"], "EURUSDT");
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"timezone": "Europe/London", "bar_caps": {{"4h": 10}}, "groq_api_key": "k"}}"#
        )
        .unwrap();

        let cfg = load_config(Some(file.path())).unwrap();
        assert_eq!(cfg.tz().unwrap(), chrono_tz::Europe::London);
        assert_eq!(cfg.bar_cap(Timeframe::FourHours), 10);
        assert_eq!(cfg.bar_cap(Timeframe::FiveMinutes), 50);
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"timezone": "Mars/Olympus"}}"#).unwrap();
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimezone(_)));
    }

    #[test]
    fn environment_overlays_credentials() {
        let env: HashMap<&str, &str> = HashMap::from([("GROQ_API_KEY", "secret"), ("FX_SNIPER_MODEL", " ")]);
        let mut cfg = AppConfig::default();
        cfg.apply_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(cfg.groq_api_key.expose_secret(), "secret");
        assert!(cfg.fred_api_key.expose_secret().is_empty());
        assert_eq!(cfg.model, "llama3-70b-8192");
    }
}
