//! Environment-derived configuration for the daily brief
//!
//! All ambient process state is read once, here; the pipeline itself only
//! ever sees explicit configuration structs.

use anyhow::{Context, Result, bail};
use brief_market::MarketConfig;
use brief_report::{OpenAiConfig, ReportConfig};
use brief_utils::{optional_env, require_env};

/// When the scheduled run fires, in a fixed-offset local time
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub hour: u32,
    pub minute: u32,
    pub utc_offset_hours: i32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        // Weekday mornings, Taipei time
        Self {
            hour: 9,
            minute: 30,
            utc_offset_hours: 8,
        }
    }
}

impl ScheduleConfig {
    fn validate(&self) -> Result<()> {
        if self.hour > 23 || self.minute > 59 {
            bail!("invalid schedule time {:02}:{:02}", self.hour, self.minute);
        }
        if self.utc_offset_hours.abs() > 14 {
            bail!("invalid UTC offset {}", self.utc_offset_hours);
        }
        Ok(())
    }
}

/// Everything the pipeline needs for one deployment
#[derive(Debug, Clone)]
pub struct BriefConfig {
    pub telegram_token: String,
    pub telegram_chat_id: String,
    pub openai: OpenAiConfig,
    pub report: ReportConfig,
    pub market: MarketConfig,
    pub schedule: ScheduleConfig,
}

impl BriefConfig {
    /// Load the full configuration from environment variables
    ///
    /// Required: `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`, `OPENAI_API_KEY`.
    /// Optional: `OPENAI_API_BASE`, `OPENAI_MODEL`, `FINNHUB_API_KEY`,
    /// `BRIEF_SCHEDULE_HOUR`, `BRIEF_SCHEDULE_MINUTE`, `BRIEF_UTC_OFFSET`.
    pub fn from_env() -> Result<Self> {
        let telegram_token =
            require_env("TELEGRAM_BOT_TOKEN").context("telegram bot token is required")?;
        let telegram_chat_id =
            require_env("TELEGRAM_CHAT_ID").context("telegram chat id is required")?;

        let mut openai = OpenAiConfig::new(
            require_env("OPENAI_API_KEY").context("report model API key is required")?,
        );
        if let Some(base) = optional_env("OPENAI_API_BASE") {
            openai = openai.with_api_base(base);
        }

        let mut report = ReportConfig::default();
        if let Some(model) = optional_env("OPENAI_MODEL") {
            report.model = model;
        }

        let market = MarketConfig::builder()
            .with_env_finnhub_key()
            .build()
            .context("invalid market configuration")?;

        let defaults = ScheduleConfig::default();
        let schedule = ScheduleConfig {
            hour: parse_env("BRIEF_SCHEDULE_HOUR", defaults.hour)?,
            minute: parse_env("BRIEF_SCHEDULE_MINUTE", defaults.minute)?,
            utc_offset_hours: parse_env("BRIEF_UTC_OFFSET", defaults.utc_offset_hours)?,
        };
        schedule.validate()?;

        Ok(Self {
            telegram_token,
            telegram_chat_id,
            openai,
            report,
            market,
            schedule,
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(name) {
        Some(value) => value
            .parse()
            .with_context(|| format!("{name} is not a valid number: {value}")),
        None => Ok(default),
    }
}
