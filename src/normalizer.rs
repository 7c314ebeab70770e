// Candle cleaning: validation, weekend and zero-volume filtering, projections
use chrono::{Datelike, Weekday};
use chrono_tz::Tz;
use std::collections::BTreeMap;
use tracing::debug;

use crate::errors::CandleError;
use crate::model::{Candle, NormalizedCandles, Ohlc, PlotSeries, PromptRecord, RawCandle, RawCandleSeries, Timeframe};
use crate::utils::{format_bar_time, parse_epoch_millis, parse_number};

/// Cleans a raw series into its plot and prompt projections.
///
/// Timestamps and prices must parse or the whole series is rejected; an unparsable
/// volume counts as zero. Weekend bars and bars without volume are dropped. The
/// result is ascending by time with one bar per timestamp (the last one delivered
/// wins). An empty result is valid.
pub fn normalize(raw: &RawCandleSeries, tz: &Tz) -> Result<NormalizedCandles, CandleError> {
    let mut by_time: BTreeMap<_, Candle> = BTreeMap::new();

    for bar in &raw.candles {
        let candle = parse_candle(bar, raw.timeframe, tz)?;
        if !is_informative(&candle) {
            continue;
        }
        by_time.insert(candle.timestamp, candle);
    }

    debug!(
        "🧹 {} {}: kept {} of {} bars",
        raw.symbol,
        raw.timeframe,
        by_time.len(),
        raw.candles.len()
    );

    let records = by_time.values().map(to_record).collect();
    let points = by_time
        .into_iter()
        .map(|(ts, c)| {
            let ohlc = Ohlc {
                open: c.open,
                high: c.high,
                low: c.low,
                close: c.close,
            };
            (ts, ohlc)
        })
        .collect();

    Ok(NormalizedCandles {
        plot: PlotSeries { points },
        records,
    })
}

fn parse_candle(bar: &RawCandle, timeframe: Timeframe, tz: &Tz) -> Result<Candle, CandleError> {
    let timestamp = parse_epoch_millis(bar.open_time_ms, tz).ok_or_else(|| CandleError::Malformed {
        timeframe,
        message: format!("invalid bar timestamp {}", bar.open_time_ms),
    })?;

    let price = |field: &str, text: &str| {
        parse_number(text).ok_or_else(|| CandleError::Malformed {
            timeframe,
            message: format!("invalid {field} price {text:?} at {}", format_bar_time(&timestamp)),
        })
    };

    Ok(Candle {
        timestamp,
        open: price("open", &bar.open)?,
        high: price("high", &bar.high)?,
        low: price("low", &bar.low)?,
        close: price("close", &bar.close)?,
        volume: parse_number(&bar.volume).unwrap_or(0.0),
    })
}

fn is_informative(candle: &Candle) -> bool {
    let weekend = matches!(candle.timestamp.weekday(), Weekday::Sat | Weekday::Sun);
    !weekend && candle.volume > 0.0
}

fn to_record(candle: &Candle) -> PromptRecord {
    PromptRecord {
        datetime: format_bar_time(&candle.timestamp),
        open: candle.open,
        high: candle.high,
        low: candle.low,
        close: candle.close,
        volume: candle.volume,
    }
}
