use chrono::Local;
use clap::Parser;
use fx_sniper::config::load_config;
use fx_sniper::model::Timeframe;
use fx_sniper::pipeline::{Pipeline, RunRequest, RunResult};
use fx_sniper::prompt::Strategy;
use fx_sniper::prompt::strategy::DEFAULT_CUSTOM_INSTRUCTION;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(author, version, about = "Macro and multi-timeframe candle analysis through a hosted language model")]
struct Cli {
    /// Instrument symbol (e.g. XAUUSD)
    #[arg(short, long, default_value = "XAUUSD")]
    symbol: String,

    /// Instruction template to send with the market data
    #[arg(long, value_enum, default_value_t = Strategy::Long)]
    strategy: Strategy,

    /// Free-text instruction, used with `--strategy custom`
    #[arg(long, default_value = DEFAULT_CUSTOM_INSTRUCTION)]
    instruction: String,

    /// Translate the analysis once it is produced
    #[arg(long)]
    translate: bool,

    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory the analysis text is saved into
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt::init();

    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let pipeline = match Pipeline::from_config(&config) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to initialize pipeline: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let request = RunRequest::new(&cli.symbol)
        .with_strategy(cli.strategy, cli.instruction)
        .with_translation(cli.translate);

    let result = pipeline.run(&request).await;
    report(&result);

    let text = result.final_text();
    println!("{text}");

    if result.is_aborted() {
        return ExitCode::FAILURE;
    }
    if let Some(dir) = &cli.out_dir {
        save_analysis(dir, &result.analysis_file_name(&Local::now()), &text);
    }
    ExitCode::SUCCESS
}

/// Logs what a display surface would show next to the analysis.
fn report(result: &RunResult) {
    if let Some(indicators) = &result.indicators {
        for (indicator, value) in indicators.iter() {
            info!("📊 {}: {}", indicator.name(), value);
        }
    }

    for timeframe in Timeframe::ALL {
        match result.plots.get(&timeframe) {
            Some(series) if series.is_empty() => warn!("{} has no usable data", timeframe),
            Some(series) => info!(
                "🕯 {}: {} bars, last close {:.2}",
                timeframe,
                series.len(),
                series.last_close().unwrap_or_default()
            ),
            None => {}
        }
    }
}

fn save_analysis(dir: &Path, file_name: &str, text: &str) {
    if let Err(e) = fs::create_dir_all(dir) {
        warn!("Failed to create output folder: {}", e);
        return;
    }
    let path = dir.join(file_name);
    if let Err(e) = fs::write(&path, text) {
        warn!("Failed to write analysis: {}", e);
    } else {
        info!("Saved analysis: {}", path.display());
    }
}
