use crate::errors::{CandleError, IndicatorError};
use crate::model::{IndicatorSet, RawCandleSeries, Timeframe};

/// Latest macroeconomic indicator values, all or nothing.
#[async_trait::async_trait]
pub trait IndicatorSource: Send + Sync {
    async fn fetch_indicators(&self) -> Result<IndicatorSet, IndicatorError>;
}

/// Most recent OHLCV bars for one symbol at one timeframe.
#[async_trait::async_trait]
pub trait CandleSource: Send + Sync {
    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        bar_limit: u32,
    ) -> Result<RawCandleSeries, CandleError>;
}
