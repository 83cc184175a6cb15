//! Daily US market brief bot
//!
//! Pulls live quotes and price history, derives indicators and rankings,
//! has a chat model write the narrative, and delivers it to Telegram.
//!
//! # Usage
//!
//! ```bash
//! export TELEGRAM_BOT_TOKEN="..."
//! export TELEGRAM_CHAT_ID="..."
//! export OPENAI_API_KEY="..."
//!
//! # One report right now
//! marketbrief run
//!
//! # Weekday schedule (09:30 UTC+8 by default)
//! marketbrief schedule
//! ```

mod config;
mod pipeline;
mod schedule;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use config::BriefConfig;
use pipeline::{DailyBrief, RunOutcome};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "marketbrief")]
#[command(about = "Daily US market brief bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate and deliver one brief immediately
    Run,
    /// Run on the weekday schedule until stopped
    Schedule,
}

fn build_brief(config: &BriefConfig) -> Result<DailyBrief> {
    let snapshot = brief_market::snapshot_builder(&config.market)?;

    let model = brief_report::OpenAiModel::with_config(config.openai.clone())?;
    let generator = brief_report::ReportGenerator::new(Arc::new(model), config.report.clone());

    let api = brief_telegram::TelegramApi::new(&config.telegram_token, &config.telegram_chat_id);
    let delivery = brief_telegram::DeliveryChannel::new(Arc::new(api));

    Ok(DailyBrief::new(snapshot, generator, delivery))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    brief_utils::init_tracing();

    let cli = Cli::parse();
    let config = BriefConfig::from_env()?;
    let brief = build_brief(&config)?;

    match cli.command {
        Command::Run => match brief.run().await? {
            RunOutcome::Delivered { message_ids } => {
                info!(segments = message_ids.len(), "run complete");
                Ok(())
            }
            RunOutcome::AbortedNoData => bail!("run aborted: no market data available"),
        },
        Command::Schedule => schedule::run_forever(&brief, &config.schedule).await,
    }
}
