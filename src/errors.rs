use thiserror::Error;

use crate::model::Timeframe;

/// Failures while fetching the macroeconomic indicator set.
#[derive(Debug, Error)]
pub enum IndicatorError {
    #[error("missing statistics provider credential (FRED_API_KEY)")]
    MissingCredential,

    #[error("request for {series} failed: {source}")]
    Request {
        series: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("provider rejected {series} [{status}]: {body}")]
    Api {
        series: &'static str,
        status: u16,
        body: String,
    },

    #[error("no numeric observation available for {0}")]
    NoObservation(&'static str),

    #[error("indicator {0} is missing from the set")]
    Incomplete(&'static str),
}

/// Failures for a single timeframe's candle series.
#[derive(Debug, Error)]
pub enum CandleError {
    #[error("{timeframe} candle fetch failed: {source}")]
    Request {
        timeframe: Timeframe,
        #[source]
        source: reqwest::Error,
    },

    #[error("{timeframe} candle fetch failed: provider returned [{status}] {body}")]
    Api {
        timeframe: Timeframe,
        status: u16,
        body: String,
    },

    #[error("{timeframe} candle fetch failed: no data returned")]
    Empty { timeframe: Timeframe },

    #[error("{timeframe} candle fetch failed: {message}")]
    Malformed { timeframe: Timeframe, message: String },
}

/// Failures of the hosted inference call.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("AI analysis error: missing inference credential (GROQ_API_KEY)")]
    MissingCredential,

    #[error("AI analysis error: request rate limited after {attempts} attempts, try again later")]
    RateLimited { attempts: u32 },

    #[error("AI analysis error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("AI analysis error: service returned [{status}] {body}")]
    Api { status: u16, body: String },

    #[error("AI analysis error: malformed response: {0}")]
    MalformedResponse(String),
}

impl InferenceError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, InferenceError::RateLimited { .. })
    }
}

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("translation failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("translation failed: service returned [{status}] {body}")]
    Api { status: u16, body: String },

    #[error("translation failed: malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown timezone: {0}")]
    InvalidTimezone(String),

    #[error("invalid config value: {0}")]
    Invalid(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Reasons a pipeline run aborts before any inference happens.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("macro data fetch failed: {0}")]
    IndicatorFetch(#[from] IndicatorError),

    #[error("{}", .0.join("；"))]
    AllCandlesFailed(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candle_failures_join_with_fullwidth_separator() {
        let err = PipelineError::AllCandlesFailed(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "a；b");
    }

    #[test]
    fn candle_error_names_its_timeframe() {
        let err = CandleError::Empty {
            timeframe: Timeframe::OneHour,
        };
        assert_eq!(err.to_string(), "1h candle fetch failed: no data returned");
    }

    #[test]
    fn indicator_failure_is_prefixed() {
        let err = PipelineError::from(IndicatorError::MissingCredential);
        assert!(err.to_string().starts_with("macro data fetch failed: "));
    }
}
