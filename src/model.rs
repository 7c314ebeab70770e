// Core structs: Indicator, IndicatorSet, Timeframe, candles and their projections
use chrono::DateTime;
use chrono_tz::Tz;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::{CandleError, IndicatorError};
use crate::utils::round2;

/// Macroeconomic series included in every analysis request.
///
/// Declaration order is the order indicators are listed in the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Indicator {
    Cpi,
    UnemploymentRate,
    FederalFundsRate,
    M2MoneySupply,
    TreasuryYield10Y,
    NonfarmPayrolls,
}

impl Indicator {
    pub const ALL: [Indicator; 6] = [
        Indicator::Cpi,
        Indicator::UnemploymentRate,
        Indicator::FederalFundsRate,
        Indicator::M2MoneySupply,
        Indicator::TreasuryYield10Y,
        Indicator::NonfarmPayrolls,
    ];

    /// Display name used as the key when the set is shown or serialized.
    pub fn name(self) -> &'static str {
        match self {
            Indicator::Cpi => "CPI",
            Indicator::UnemploymentRate => "Unemployment Rate",
            Indicator::FederalFundsRate => "Federal Funds Rate",
            Indicator::M2MoneySupply => "M2 Money Supply",
            Indicator::TreasuryYield10Y => "10Y Treasury Yield",
            Indicator::NonfarmPayrolls => "Nonfarm Payrolls",
        }
    }

    /// Series code at the statistics provider.
    pub fn series_code(self) -> &'static str {
        match self {
            Indicator::Cpi => "CPIAUCSL",
            Indicator::UnemploymentRate => "UNRATE",
            Indicator::FederalFundsRate => "FEDFUNDS",
            Indicator::M2MoneySupply => "M2SL",
            Indicator::TreasuryYield10Y => "GS10",
            Indicator::NonfarmPayrolls => "PAYEMS",
        }
    }

    pub fn prompt_label(self) -> &'static str {
        match self {
            Indicator::Cpi => "CPI",
            Indicator::UnemploymentRate => "Unemployment rate",
            Indicator::FederalFundsRate => "Federal funds rate",
            Indicator::M2MoneySupply => "M2 money supply",
            Indicator::TreasuryYield10Y => "10-year Treasury yield",
            Indicator::NonfarmPayrolls => "Nonfarm Payrolls",
        }
    }

    pub fn unit_suffix(self) -> &'static str {
        match self {
            Indicator::UnemploymentRate
            | Indicator::FederalFundsRate
            | Indicator::TreasuryYield10Y => "%",
            Indicator::NonfarmPayrolls => " thousand jobs",
            Indicator::Cpi | Indicator::M2MoneySupply => "",
        }
    }
}

/// Latest value of every [`Indicator`], rounded to two decimals.
///
/// A set can only be built when all indicators are present, so lookups never miss.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    values: BTreeMap<Indicator, f64>,
}

impl IndicatorSet {
    pub fn from_values<I>(values: I) -> Result<Self, IndicatorError>
    where
        I: IntoIterator<Item = (Indicator, f64)>,
    {
        let values: BTreeMap<Indicator, f64> = values
            .into_iter()
            .map(|(indicator, value)| (indicator, round2(value)))
            .collect();

        if let Some(missing) = Indicator::ALL.iter().find(|i| !values.contains_key(i)) {
            return Err(IndicatorError::Incomplete(missing.name()));
        }

        Ok(Self { values })
    }

    pub fn get(&self, indicator: Indicator) -> f64 {
        self.values[&indicator]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Indicator, f64)> + '_ {
        self.values.iter().map(|(i, v)| (*i, *v))
    }
}

/// Candle granularities requested for every run, finest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "5min")]
    FiveMinutes,
    #[serde(rename = "15min")]
    FifteenMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [
        Timeframe::FiveMinutes,
        Timeframe::FifteenMinutes,
        Timeframe::OneHour,
        Timeframe::FourHours,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Timeframe::FiveMinutes => "5min",
            Timeframe::FifteenMinutes => "15min",
            Timeframe::OneHour => "1h",
            Timeframe::FourHours => "4h",
        }
    }

    /// Interval code understood by the candle provider.
    pub fn interval(self) -> &'static str {
        match self {
            Timeframe::FiveMinutes => "5m",
            Timeframe::FifteenMinutes => "15m",
            Timeframe::OneHour => "1h",
            Timeframe::FourHours => "4h",
        }
    }

    /// How many of the most recent bars go into the prompt unless configured otherwise.
    pub fn default_bar_cap(self) -> usize {
        match self {
            Timeframe::FiveMinutes => 50,
            Timeframe::FifteenMinutes => 30,
            Timeframe::OneHour => 20,
            Timeframe::FourHours => 15,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}


/// A bar as delivered by the provider, before any validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCandle {
    /// Bar open time in epoch milliseconds.
    pub open_time_ms: i64,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawCandleSeries {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub candles: Vec<RawCandle>,
}

/// A validated bar with its timestamp in the display timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub timestamp: DateTime<Tz>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Plain record rendered into the prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRecord {
    pub datetime: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ohlc {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Chart-ready series keyed by bar timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotSeries {
    pub points: BTreeMap<DateTime<Tz>, Ohlc>,
}

impl PlotSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.points.values().next_back().map(|p| p.close)
    }
}

/// Both projections of one cleaned candle series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedCandles {
    pub plot: PlotSeries,
    pub records: Vec<PromptRecord>,
}

/// Per-timeframe fetch outcome, iterated in canonical timeframe order.
pub type TimeframeBundle = BTreeMap<Timeframe, Result<NormalizedCandles, CandleError>>;
