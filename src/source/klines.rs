use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, warn};

use crate::errors::CandleError;
use crate::model::{RawCandle, RawCandleSeries, Timeframe};
use crate::source::traits::CandleSource;
use crate::utils::json_scalar_to_string;

/// Market-data client for exchanges serving kline arrays
/// (`[open_time, open, high, low, close, volume, ...]`) without authentication.
pub struct KlineClient {
    client: Client,
    base_url: String,
    venue: String,
    /// Instrument symbol -> symbol listed by the venue.
    aliases: BTreeMap<String, String>,
}

impl KlineClient {
    pub fn new(
        base_url: impl Into<String>,
        venue: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) FxSniper/0.1")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            venue: venue.into(),
            aliases: BTreeMap::new(),
        })
    }

    pub fn with_aliases(mut self, aliases: BTreeMap<String, String>) -> Self {
        self.aliases = aliases
            .into_iter()
            .map(|(from, to)| (from.trim().to_uppercase(), to))
            .collect();
        self
    }

    /// Symbol sent to the venue; unmapped symbols pass through unchanged.
    fn provider_symbol<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.aliases.get(symbol).map(String::as_str).unwrap_or(symbol)
    }
}

/// Converts provider rows into raw candles. Rows too short to carry OHLCV are malformed.
fn parse_rows(rows: &[Vec<Value>], timeframe: Timeframe) -> Result<Vec<RawCandle>, CandleError> {
    rows.iter()
        .map(|row| {
            if row.len() < 6 {
                return Err(CandleError::Malformed {
                    timeframe,
                    message: format!("kline row has {} fields, expected at least 6", row.len()),
                });
            }
            let open_time_ms = row[0].as_i64().ok_or_else(|| CandleError::Malformed {
                timeframe,
                message: format!("invalid kline open time {}", row[0]),
            })?;
            Ok(RawCandle {
                open_time_ms,
                open: json_scalar_to_string(&row[1]),
                high: json_scalar_to_string(&row[2]),
                low: json_scalar_to_string(&row[3]),
                close: json_scalar_to_string(&row[4]),
                volume: json_scalar_to_string(&row[5]),
            })
        })
        .collect()
}

#[async_trait::async_trait]
impl CandleSource for KlineClient {
    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        bar_limit: u32,
    ) -> Result<RawCandleSeries, CandleError> {
        let listed = self.provider_symbol(symbol);
        info!("📥 Fetching {} {} bars of {} ({}) from {}", bar_limit, timeframe, symbol, listed, self.venue);

        let query = [
            ("symbol", listed.to_string()),
            ("interval", timeframe.interval().to_string()),
            ("limit", bar_limit.to_string()),
        ];

        let response = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|source| CandleError::Request { timeframe, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "unknown".into());
            warn!("❌ {} responded [{}] for {} {}", self.venue, status, symbol, timeframe);
            return Err(CandleError::Api {
                timeframe,
                status: status.as_u16(),
                body,
            });
        }

        let rows = response
            .json::<Vec<Vec<Value>>>()
            .await
            .map_err(|source| CandleError::Request { timeframe, source })?;

        if rows.is_empty() {
            return Err(CandleError::Empty { timeframe });
        }

        Ok(RawCandleSeries {
            symbol: symbol.to_string(),
            timeframe,
            candles: parse_rows(&rows, timeframe)?,
        })
    }
}
