use clap::ValueEnum;

/// Instruction default offered by the shell for custom analysis.
pub const DEFAULT_CUSTOM_INSTRUCTION: &str = "You are a professional forex market analyst. Based on the macroeconomic data and multi-timeframe candlestick price action data I provide, analyze current conditions and provide actionable short-term strategies focused on the 15m and 5m timeframes. Include: 1) key support/resistance, 2) long/short direction, 3) entry, 4) TP & SL levels, with brief reasoning grounded in price structure and macro context.";

/// Which instruction accompanies the market data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Strategy {
    /// Short-term long setup, 50-100 pips.
    #[default]
    Long,
    /// Short-term short setup, 50-100 pips.
    Short,
    /// Free-text instruction supplied by the user.
    Custom,
}

pub fn long_instruction(symbol: &str) -> String {
    format!(
        "Act as a short-term forex analyst. Based on the provided macroeconomic data \
and multi-timeframe candlestick charts, analyze the current market condition of {symbol} on the 5-minute timeframe.\n\n\
I am looking for a potential short-term long (buy) trade setup, targeting a profit of 50–100 pips.\n\n\
However, do not conclude that the market is bullish or that it is the right entry point just because I am looking for a buy setup. \
Provide your independent professional judgment. If the market is not favorable for a long position, explain why.\n\n\
Please include:\n\
1. Current market bias: bullish or bearish?\n\
2. Trade direction: buy or sell?\n\
3. Suggested entry price\n\
4. Take profit (TP) level — target 50–100 pips above entry\n\
5. Stop loss (SL) level\n\
6. Reasoning: key technical factors (support/resistance, candlestick patterns, momentum) and relevant macro influences."
    )
}

pub fn short_instruction(symbol: &str) -> String {
    format!(
        "Act as a short-term forex analyst. Based on the provided macroeconomic data \
and multi-timeframe candlestick charts, analyze the current market condition of {symbol} on the 5-minute timeframe.\n\n\
I am looking for a potential short-term short (sell) trade setup, targeting a profit of 50–100 pips.\n\n\
However, do not conclude that the market is bearish or that it is the right entry point just because I am looking for a sell setup. \
Provide your independent professional judgment. If the market is not favorable for a short position, explain why.\n\n\
Please include:\n\
1. Current market bias: bullish or bearish?\n\
2. Trade direction: buy or sell?\n\
3. Suggested entry price\n\
4. Take profit (TP) level — target 50–100 pips below entry\n\
5. Stop loss (SL) level\n\
6. Reasoning: key technical factors (resistance, candlestick patterns, momentum) and relevant macro influences."
    )
}

/// Picks the instruction for a run. A blank custom instruction falls back to the long template.
pub fn select_instruction(strategy: Strategy, custom: &str, symbol: &str) -> String {
    match strategy {
        Strategy::Long => long_instruction(symbol),
        Strategy::Short => short_instruction(symbol),
        Strategy::Custom => match custom.trim() {
            "" => long_instruction(symbol),
            text => text.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_mention_symbol_and_bias() {
        let long = long_instruction("EURUSD");
        assert!(long.contains("condition of EURUSD on the 5-minute timeframe"));
        assert!(long.contains("long (buy) trade setup"));
        assert!(long.contains("independent professional judgment"));

        let short = short_instruction("EURUSD");
        assert!(short.contains("short (sell) trade setup"));
        assert!(short.contains("50–100 pips below entry"));
    }

    #[test]
    fn templates_keep_paragraph_breaks() {
        assert!(long_instruction("X").contains("timeframe.\n\nI am looking"));
        assert!(long_instruction("X").ends_with("relevant macro influences."));
    }

    #[test]
    fn blank_custom_falls_back_to_long() {
        assert_eq!(select_instruction(Strategy::Custom, "  \n", "XAUUSD"), long_instruction("XAUUSD"));
    }

    #[test]
    fn custom_text_is_trimmed() {
        assert_eq!(select_instruction(Strategy::Custom, "  be brief  ", "XAUUSD"), "be brief");
        assert_eq!(select_instruction(Strategy::Short, "ignored", "XAUUSD"), short_instruction("XAUUSD"));
    }
}
