//! Ranking and aggregation over a fetched snapshot

use crate::snapshot::MarketSnapshot;
use crate::universe::UniverseEntry;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How far ahead the earnings calendar looks
pub const EARNINGS_WINDOW_DAYS: i64 = 7;

/// An upcoming earnings report inside the calendar window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarningsEvent {
    pub symbol: String,
    pub name: String,
    pub when: DateTime<Utc>,
}

/// Derived views over one run's snapshot
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Deduplicated movers, sorted by percent change descending
    pub ranking: Vec<UniverseEntry>,
    /// Upcoming earnings, ascending by timestamp; empty means the calendar
    /// section is omitted from the report
    pub earnings: Vec<EarningsEvent>,
}

impl Aggregation {
    /// The strongest `n` movers, best first
    pub fn top_movers(&self, n: usize) -> &[UniverseEntry] {
        &self.ranking[..self.ranking.len().min(n)]
    }

    /// The weakest `n` movers, worst first
    pub fn bottom_movers(&self, n: usize) -> Vec<&UniverseEntry> {
        self.ranking.iter().rev().take(n).collect()
    }
}

/// Build the derived views from a snapshot
///
/// The mega-cap basket and sector baskets overlap; the ranking keeps the
/// first occurrence per symbol. Ties in percent change keep their input
/// order (the sort is stable).
pub fn aggregate(snapshot: &MarketSnapshot, now: DateTime<Utc>) -> Aggregation {
    let movers = snapshot
        .mega_caps
        .iter()
        .chain(snapshot.sector_entries.iter());

    let mut seen = HashSet::new();
    let mut ranking: Vec<UniverseEntry> = movers
        .filter(|entry| entry.quote.change_percent.is_finite())
        .filter(|entry| seen.insert(entry.symbol.clone()))
        .cloned()
        .collect();

    ranking.sort_by(|a, b| {
        b.quote
            .change_percent
            .partial_cmp(&a.quote.change_percent)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Aggregation {
        earnings: earnings_calendar(snapshot, now),
        ranking,
    }
}

/// Upcoming earnings strictly after `now` and at most seven days ahead
fn earnings_calendar(snapshot: &MarketSnapshot, now: DateTime<Utc>) -> Vec<EarningsEvent> {
    let horizon = now + Duration::days(EARNINGS_WINDOW_DAYS);

    let mut seen = HashSet::new();
    let mut events: Vec<EarningsEvent> = snapshot
        .all_entries()
        .filter_map(|entry| {
            let when = entry.quote.earnings_timestamp?;
            if when > now && when <= horizon && seen.insert(entry.symbol.clone()) {
                Some(EarningsEvent {
                    symbol: entry.symbol.clone(),
                    name: entry.name.clone(),
                    when,
                })
            } else {
                None
            }
        })
        .collect();

    events.sort_by_key(|event| event.when);
    events
}
