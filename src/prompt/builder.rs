use std::collections::BTreeMap;

use crate::config::AppConfig;
use crate::model::{IndicatorSet, PromptRecord, Timeframe, TimeframeBundle};

/// Renders indicator values and candle summaries into the inference prompt.
///
/// The layout is what the inference service is tuned against: field order,
/// labels and number formats must stay exactly as they are.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    bar_caps: BTreeMap<Timeframe, usize>,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(
            Timeframe::ALL
                .iter()
                .map(|tf| (*tf, tf.default_bar_cap()))
                .collect(),
        )
    }
}

impl PromptBuilder {
    pub fn new(bar_caps: BTreeMap<Timeframe, usize>) -> Self {
        Self { bar_caps }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Timeframe::ALL.iter().map(|tf| (*tf, config.bar_cap(*tf))).collect())
    }

    pub fn bar_cap(&self, timeframe: Timeframe) -> usize {
        self.bar_caps
            .get(&timeframe)
            .copied()
            .unwrap_or_else(|| timeframe.default_bar_cap())
    }

    pub fn build(
        &self,
        indicators: &IndicatorSet,
        bundle: &TimeframeBundle,
        instruction: &str,
        symbol: &str,
    ) -> String {
        let mut prompt = String::from("\n📊 Latest U.S. macroeconomic indicators:\n");
        for (indicator, value) in indicators.iter() {
            prompt.push_str(&format!(
                "- {}: {}{}\n",
                indicator.prompt_label(),
                display_value(value),
                indicator.unit_suffix()
            ));
        }

        prompt.push_str(&format!(
            "\n🕒 {} multi-timeframe candlestick data:\n{}\n\n📌 Your task:\n{}\n",
            symbol,
            self.render_summary(bundle),
            instruction
        ));
        prompt
    }

    /// One block per timeframe in canonical order; failed timeframes become a one-line notice.
    pub fn render_summary(&self, bundle: &TimeframeBundle) -> String {
        let mut summary = String::new();
        for (timeframe, entry) in bundle {
            let candles = match entry {
                Ok(candles) => candles,
                Err(_) => {
                    summary.push_str(&format!("[{timeframe}] 抓取失敗\n"));
                    continue;
                }
            };

            let cap = self.bar_cap(*timeframe);
            summary.push_str(&format!("\n[{timeframe}] 最近 {cap} 根K線：\n"));
            for record in recent(&candles.records, cap) {
                summary.push_str(&format_record(record));
            }
        }
        summary
    }
}

/// The last `cap` records.
fn recent(records: &[PromptRecord], cap: usize) -> &[PromptRecord] {
    &records[records.len().saturating_sub(cap)..]
}

fn format_record(record: &PromptRecord) -> String {
    format!(
        "{} | O: {:.2}, H: {:.2}, L: {:.2}, C: {:.2}, V: {:.0}\n",
        record.datetime, record.open, record.high, record.low, record.close, record.volume
    )
}

/// Shortest round-trip form with a mandatory fraction: `310.3`, `159000.0`.
fn display_value(value: f64) -> String {
    format!("{value:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CandleError;
    use crate::model::{Indicator, NormalizedCandles};
    use proptest::prelude::*;

    fn indicators() -> IndicatorSet {
        IndicatorSet::from_values([
            (Indicator::Cpi, 310.3),
            (Indicator::UnemploymentRate, 4.1),
            (Indicator::FederalFundsRate, 4.33),
            (Indicator::M2MoneySupply, 21561.4),
            (Indicator::TreasuryYield10Y, 4.28),
            (Indicator::NonfarmPayrolls, 159000.0),
        ])
        .unwrap()
    }

    fn record(minute: usize, close: f64) -> PromptRecord {
        PromptRecord {
            datetime: format!("2024-01-01 {:02}:{:02}", minute / 60, minute % 60),
            open: 2062.1,
            high: 2063.0,
            low: 2061.5,
            close,
            volume: 148.6,
        }
    }

    fn candles(records: Vec<PromptRecord>) -> NormalizedCandles {
        NormalizedCandles {
            records,
            ..Default::default()
        }
    }

    #[test]
    fn renders_exact_layout() {
        let mut bundle = TimeframeBundle::new();
        bundle.insert(Timeframe::FifteenMinutes, Ok(candles(vec![record(0, 2062.8)])));
        bundle.insert(
            Timeframe::FiveMinutes,
            Err(CandleError::Empty {
                timeframe: Timeframe::FiveMinutes,
            }),
        );

        let prompt = PromptBuilder::default().build(&indicators(), &bundle, "Do it.", "XAUUSD");

        let expected = "\n📊 Latest U.S. macroeconomic indicators:\n\
- CPI: 310.3\n\
- Unemployment rate: 4.1%\n\
- Federal funds rate: 4.33%\n\
- M2 money supply: 21561.4\n\
- 10-year Treasury yield: 4.28%\n\
- Nonfarm Payrolls: 159000.0 thousand jobs\n\
\n🕒 XAUUSD multi-timeframe candlestick data:\n\
[5min] 抓取失敗\n\
\n[15min] 最近 30 根K線：\n\
2024-01-01 00:00 | O: 2062.10, H: 2063.00, L: 2061.50, C: 2062.80, V: 149\n\
\n\n📌 Your task:\nDo it.\n";
        assert_eq!(prompt, expected);
    }

    #[test]
    fn empty_series_renders_header_only() {
        let mut bundle = TimeframeBundle::new();
        bundle.insert(Timeframe::OneHour, Ok(candles(vec![])));
        let summary = PromptBuilder::default().render_summary(&bundle);
        assert_eq!(summary, "\n[1h] 最近 20 根K線：\n");
    }

    #[test]
    fn configured_caps_apply() {
        let caps = BTreeMap::from([(Timeframe::FourHours, 2)]);
        let mut bundle = TimeframeBundle::new();
        bundle.insert(
            Timeframe::FourHours,
            Ok(candles((0..5).map(|i| record(i, i as f64)).collect())),
        );
        let summary = PromptBuilder::new(caps).render_summary(&bundle);
        assert!(summary.starts_with("\n[4h] 最近 2 根K線：\n"));
        assert!(summary.contains("C: 3.00"));
        assert!(summary.contains("C: 4.00"));
        assert!(!summary.contains("C: 2.00"));
    }

    proptest! {
        #[test]
        fn renders_at_most_cap_most_recent_bars(len in 0usize..120, tf_index in 0usize..4) {
            let timeframe = Timeframe::ALL[tf_index];
            let records: Vec<_> = (0..len).map(|i| record(i, i as f64)).collect();
            let mut bundle = TimeframeBundle::new();
            bundle.insert(timeframe, Ok(candles(records.clone())));

            let builder = PromptBuilder::default();
            let summary = builder.render_summary(&bundle);
            let lines: Vec<&str> = summary.lines().filter(|l| l.contains(" | O: ")).collect();

            let cap = timeframe.default_bar_cap();
            prop_assert_eq!(lines.len(), len.min(cap));
            for (line, rec) in lines.iter().zip(&records[len.saturating_sub(cap)..]) {
                prop_assert!(line.starts_with(&rec.datetime));
            }
        }

        #[test]
        fn build_is_deterministic(len in 0usize..60, instruction in ".{0,40}") {
            let mut bundle = TimeframeBundle::new();
            bundle.insert(Timeframe::FiveMinutes, Ok(candles((0..len).map(|i| record(i, 1.0)).collect())));
            bundle.insert(Timeframe::OneHour, Err(CandleError::Empty { timeframe: Timeframe::OneHour }));

            let builder = PromptBuilder::default();
            let first = builder.build(&indicators(), &bundle, &instruction, "XAUUSD");
            let second = builder.build(&indicators(), &bundle, &instruction, "XAUUSD");
            prop_assert_eq!(first, second);
        }
    }
}
