//! Weekday scheduling for the daily run
//!
//! The cadence lives in a fixed-offset local time (no DST handling): every
//! weekday at the configured hour and minute.

use crate::config::ScheduleConfig;
use crate::pipeline::DailyBrief;
use anyhow::Result;
use chrono::{DateTime, Datelike, FixedOffset, TimeZone, Utc, Weekday};
use tracing::{error, info};

/// The next weekday run time strictly after `now`
pub fn next_run(now: DateTime<Utc>, schedule: &ScheduleConfig) -> DateTime<Utc> {
    let offset = FixedOffset::east_opt(schedule.utc_offset_hours * 3600)
        .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"));

    let mut day = now.with_timezone(&offset).date_naive();
    loop {
        let candidate = day
            .and_hms_opt(schedule.hour, schedule.minute, 0)
            .and_then(|naive| offset.from_local_datetime(&naive).single());

        if let Some(candidate) = candidate {
            let is_weekday = !matches!(candidate.weekday(), Weekday::Sat | Weekday::Sun);
            let candidate_utc = candidate.with_timezone(&Utc);
            if is_weekday && candidate_utc > now {
                return candidate_utc;
            }
        }

        day = day.succ_opt().expect("date range exhausted");
    }
}

/// Run the brief on the weekday cadence until the process is stopped
///
/// A failed run is logged and the loop keeps going; the next scheduled run
/// starts fresh.
pub async fn run_forever(brief: &DailyBrief, schedule: &ScheduleConfig) -> Result<()> {
    info!(
        "schedule active: weekdays at {:02}:{:02} (UTC{:+})",
        schedule.hour, schedule.minute, schedule.utc_offset_hours
    );

    loop {
        let now = Utc::now();
        let next = next_run(now, schedule);
        let wait = (next - now).to_std().unwrap_or_default();
        info!(next = %next, wait_secs = wait.as_secs(), "sleeping until next run");
        tokio::time::sleep(wait).await;

        match brief.run().await {
            Ok(outcome) => info!(?outcome, "scheduled run finished"),
            Err(err) => error!(error = %err, "scheduled run failed"),
        }
    }
}
