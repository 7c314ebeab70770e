use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::errors::IndicatorError;
use crate::model::{Indicator, IndicatorSet};
use crate::source::traits::IndicatorSource;
use crate::utils::parse_number;

/// Recent observations scanned for the latest numeric value.
const OBSERVATION_WINDOW: &str = "10";

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

/// Statistics provider client (FRED series observations API).
pub struct FredClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl FredClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key,
        })
    }

    async fn latest_value(&self, indicator: Indicator) -> Result<f64, IndicatorError> {
        let series = indicator.series_code();
        let query = [
            ("series_id", series),
            ("api_key", self.api_key.expose_secret()),
            ("file_type", "json"),
            ("sort_order", "desc"),
            ("limit", OBSERVATION_WINDOW),
        ];

        let response = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|source| IndicatorError::Request { series, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "unknown".into());
            warn!("❌ FRED responded [{}] for {}", status, series);
            return Err(IndicatorError::Api {
                series,
                status: status.as_u16(),
                body,
            });
        }

        let parsed = response
            .json::<ObservationsResponse>()
            .await
            .map_err(|source| IndicatorError::Request { series, source })?;

        let (date, value) =
            latest_numeric(&parsed.observations).ok_or(IndicatorError::NoObservation(series))?;
        debug!("{} = {} (observed {})", series, value, date);
        Ok(value)
    }
}

/// First numeric value of a newest-first observation list; placeholders like `.` are skipped.
fn latest_numeric(observations: &[Observation]) -> Option<(&str, f64)> {
    observations
        .iter()
        .find_map(|o| parse_number(&o.value).map(|v| (o.date.as_str(), v)))
}

#[async_trait::async_trait]
impl IndicatorSource for FredClient {
    async fn fetch_indicators(&self) -> Result<IndicatorSet, IndicatorError> {
        if self.api_key.expose_secret().is_empty() {
            return Err(IndicatorError::MissingCredential);
        }

        let mut values = Vec::with_capacity(Indicator::ALL.len());
        for indicator in Indicator::ALL {
            let value = self.latest_value(indicator).await?;
            values.push((indicator, value));
        }

        let set = IndicatorSet::from_values(values)?;
        info!("✅ Macro indicators fetched ({} series)", Indicator::ALL.len());
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(date: &str, value: &str) -> Observation {
        Observation {
            date: date.into(),
            value: value.into(),
        }
    }

    #[test]
    fn skips_missing_observations() {
        let list = vec![obs("2025-02-01", "."), obs("2025-01-01", "4.1"), obs("2024-12-01", "4.2")];
        assert_eq!(latest_numeric(&list), Some(("2025-01-01", 4.1)));
    }

    #[test]
    fn no_numeric_observation_yields_none() {
        assert_eq!(latest_numeric(&[obs("2025-02-01", ".")]), None);
        assert_eq!(latest_numeric(&[]), None);
    }

    #[test]
    fn parses_provider_payload() {
        let body = r#"{"realtime_start":"2025-01-01","observations":[{"date":"2025-01-01","value":"310.326","realtime_start":"x"}]}"#;
        let parsed: ObservationsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(latest_numeric(&parsed.observations), Some(("2025-01-01", 310.326)));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let client = FredClient::new(
            "http://127.0.0.1:9/unreachable",
            SecretString::from(String::new()),
            Duration::from_secs(1),
        )
        .unwrap();
        let err = client.fetch_indicators().await.unwrap_err();
        assert!(matches!(err, IndicatorError::MissingCredential));
    }
}
