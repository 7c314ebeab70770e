//! One analysis run: indicators, candles per timeframe, prompt, inference, translation.
//!
//! Every external call is converted into a typed result here; a run never
//! panics or returns early with an error. What happened is recorded in the
//! returned [`RunResult`], which replaces whatever the previous run produced.

use chrono::{DateTime, Local};
use chrono_tz::Tz;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::errors::{ConfigError, InferenceError, PipelineError, TranslationError};
use crate::inference::{GroqClient, InferenceService};
use crate::model::{IndicatorSet, PlotSeries, Timeframe, TimeframeBundle};
use crate::normalizer::normalize;
use crate::prompt::{PromptBuilder, Strategy, select_instruction};
use crate::source::{CandleSource, FredClient, IndicatorSource, KlineClient};
use crate::translator::{GoogleTranslator, Translator};
use crate::utils::analysis_file_name;

/// Inputs supplied by the presentation shell for one run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub symbol: String,
    pub strategy: Strategy,
    pub custom_instruction: String,
    pub translate: bool,
}

impl RunRequest {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            strategy: Strategy::default(),
            custom_instruction: String::new(),
            translate: false,
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy, custom_instruction: impl Into<String>) -> Self {
        self.strategy = strategy;
        self.custom_instruction = custom_instruction.into();
        self
    }

    pub fn with_translation(mut self, translate: bool) -> Self {
        self.translate = translate;
        self
    }
}

/// Everything one run produced, for display and download.
#[derive(Debug)]
pub struct RunResult {
    pub symbol: String,
    pub indicators: Option<IndicatorSet>,
    /// Chart series for the timeframes that were fetched.
    pub plots: BTreeMap<Timeframe, PlotSeries>,
    pub candle_errors: Vec<String>,
    pub prompt: Option<String>,
    pub analysis: Option<Result<String, InferenceError>>,
    pub translation: Option<Result<String, TranslationError>>,
    pub abort: Option<PipelineError>,
}

impl RunResult {
    fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            indicators: None,
            plots: BTreeMap::new(),
            candle_errors: Vec::new(),
            prompt: None,
            analysis: None,
            translation: None,
            abort: None,
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.is_some()
    }

    /// Untranslated inference output, or its error text.
    pub fn raw_text(&self) -> Option<String> {
        self.analysis.as_ref().map(|analysis| match analysis {
            Ok(text) => text.clone(),
            Err(e) => e.to_string(),
        })
    }

    /// Text to show the user: the abort reason, the translation (or its
    /// error), or the raw inference text, in that precedence.
    pub fn final_text(&self) -> String {
        if let Some(abort) = &self.abort {
            return abort.to_string();
        }
        match &self.translation {
            Some(Ok(translated)) => translated.clone(),
            Some(Err(e)) => e.to_string(),
            None => self.raw_text().unwrap_or_default(),
        }
    }

    pub fn analysis_file_name(&self, now: &DateTime<Local>) -> String {
        analysis_file_name(&self.symbol, now)
    }
}

pub struct Pipeline {
    indicators: Box<dyn IndicatorSource>,
    candles: Box<dyn CandleSource>,
    inference: Box<dyn InferenceService>,
    translator: Box<dyn Translator>,
    builder: PromptBuilder,
    tz: Tz,
    bar_limit: u32,
    source_language: String,
    target_language: String,
}

impl Pipeline {
    pub fn new(
        indicators: Box<dyn IndicatorSource>,
        candles: Box<dyn CandleSource>,
        inference: Box<dyn InferenceService>,
        translator: Box<dyn Translator>,
    ) -> Self {
        Self {
            indicators,
            candles,
            inference,
            translator,
            builder: PromptBuilder::default(),
            tz: Tz::UTC,
            bar_limit: 100,
            source_language: "en".into(),
            target_language: "zh-TW".into(),
        }
    }

    /// Wires the HTTP-backed collaborators described by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let pipeline = Self::new(
            Box::new(FredClient::new(
                config.fred_base_url.clone(),
                config.fred_api_key.clone(),
                timeout,
            )?),
            Box::new(KlineClient::new(
                config.candle_base_url.clone(),
                config.venue.clone(),
                timeout,
            )?
            .with_aliases(config.symbol_aliases.clone())),
            Box::new(GroqClient::from_config(config)?),
            Box::new(GoogleTranslator::new(config.translate_url.clone(), timeout)?),
        );

        Ok(pipeline
            .with_prompt_builder(PromptBuilder::from_config(config))
            .with_timezone(config.tz()?)
            .with_bar_limit(config.bar_limit)
            .with_languages(&config.source_language, &config.target_language))
    }

    pub fn with_prompt_builder(mut self, builder: PromptBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }

    pub fn with_bar_limit(mut self, bar_limit: u32) -> Self {
        self.bar_limit = bar_limit;
        self
    }

    pub fn with_languages(mut self, source: &str, target: &str) -> Self {
        self.source_language = source.to_string();
        self.target_language = target.to_string();
        self
    }

    pub async fn run(&self, request: &RunRequest) -> RunResult {
        let symbol = request.symbol.as_str();
        let mut result = RunResult::new(symbol);
        info!("🔍 Starting analysis run for {}", symbol);

        let indicators = match self.indicators.fetch_indicators().await {
            Ok(set) => set,
            Err(e) => {
                error!("❌ Macro data fetch failed: {}", e);
                result.abort = Some(PipelineError::IndicatorFetch(e));
                return result;
            }
        };

        let bundle = self.fetch_timeframes(symbol).await;
        for (timeframe, entry) in &bundle {
            match entry {
                Ok(candles) => {
                    result.plots.insert(*timeframe, candles.plot.clone());
                }
                Err(e) => {
                    warn!("⚠️ {}", e);
                    result.candle_errors.push(e.to_string());
                }
            }
        }

        if result.plots.is_empty() {
            error!("❌ No timeframe could be fetched for {}", symbol);
            result.indicators = Some(indicators);
            result.abort = Some(PipelineError::AllCandlesFailed(result.candle_errors.clone()));
            return result;
        }
        info!("✅ Candles ready for {}/{} timeframes", result.plots.len(), bundle.len());

        let instruction = select_instruction(request.strategy, &request.custom_instruction, symbol);
        let prompt = self.builder.build(&indicators, &bundle, &instruction, symbol);
        result.indicators = Some(indicators);

        let analysis = self.inference.infer(&prompt).await;
        result.prompt = Some(prompt);

        match &analysis {
            Err(e) if e.is_rate_limited() => warn!("⏳ {}", e),
            Err(e) => error!("❌ {}", e),
            Ok(_) => {}
        }
        result.analysis = Some(analysis);

        // Whatever inference produced is translated, error text included.
        if request.translate {
            if let Some(text) = result.raw_text() {
                let translation = self
                    .translator
                    .translate(&text, &self.source_language, &self.target_language)
                    .await;
                if let Err(e) = &translation {
                    warn!("⚠️ {}", e);
                }
                result.translation = Some(translation);
            }
        }

        info!("🏁 Analysis run for {} finished", symbol);
        result
    }

    /// Fetches and normalizes every timeframe; one failing never affects the others.
    async fn fetch_timeframes(&self, symbol: &str) -> TimeframeBundle {
        let fetches = Timeframe::ALL.into_iter().map(|timeframe| async move {
            let entry = match self.candles.fetch_candles(symbol, timeframe, self.bar_limit).await {
                Ok(raw) => normalize(&raw, &self.tz),
                Err(e) => Err(e),
            };
            (timeframe, entry)
        });

        join_all(fetches).await.into_iter().collect()
    }
}
