//! Snapshot of the full symbol universe for one run

use crate::config::MarketConfig;
use crate::indicators::IndicatorBundle;
use crate::quotes::QuoteSource;
use crate::series::SeriesSource;
use crate::universe::{INDICES, MEGA_CAPS, SECTOR_BASKETS, SymbolInfo, UniverseEntry};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// Everything fetched for one run, grouped the way it is reported
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub indices: Vec<UniverseEntry>,
    pub mega_caps: Vec<UniverseEntry>,
    pub sector_entries: Vec<UniverseEntry>,
    pub taken_at: DateTime<Utc>,
}

impl MarketSnapshot {
    /// Total number of entries that produced a usable quote
    pub fn quote_count(&self) -> usize {
        self.indices.len() + self.mega_caps.len() + self.sector_entries.len()
    }

    /// True when not a single quote was fetched
    pub fn is_empty(&self) -> bool {
        self.quote_count() == 0
    }

    /// All entries across groups, in fetch order
    pub fn all_entries(&self) -> impl Iterator<Item = &UniverseEntry> {
        self.indices
            .iter()
            .chain(self.mega_caps.iter())
            .chain(self.sector_entries.iter())
    }
}

/// Populates a [`MarketSnapshot`] from the static universe
///
/// Index and mega-cap quotes fan out fully in parallel; sector baskets run
/// parallel within a basket with a pacing delay between baskets. Historical
/// series are fetched sequentially, bounded to the indicator target set.
pub struct SnapshotBuilder {
    quotes: QuoteSource,
    series: SeriesSource,
    basket_pacing: Duration,
    series_pacing: Duration,
    movers_per_side: usize,
}

impl SnapshotBuilder {
    /// Create a builder over already-constructed sources
    pub fn new(quotes: QuoteSource, series: SeriesSource, config: &MarketConfig) -> Self {
        Self {
            quotes,
            series,
            basket_pacing: config.basket_pacing,
            series_pacing: config.series_pacing,
            movers_per_side: config.movers_per_side,
        }
    }

    /// Fetch quotes and indicators for the whole universe
    pub async fn build(&self) -> MarketSnapshot {
        let (mut indices, mut mega_caps) =
            futures::join!(self.fetch_group(INDICES), self.fetch_group(MEGA_CAPS));

        let mut sector_entries = Vec::new();
        for (i, basket) in SECTOR_BASKETS.iter().enumerate() {
            if i > 0 {
                sleep(self.basket_pacing).await;
            }
            let entries = self.fetch_group(basket.symbols).await;
            debug!(
                basket = basket.name,
                fetched = entries.len(),
                requested = basket.symbols.len(),
                "sector basket fetched"
            );
            sector_entries.extend(entries);
        }

        let targets = self.indicator_targets(&indices, &mega_caps, &sector_entries);
        info!(
            quotes = indices.len() + mega_caps.len() + sector_entries.len(),
            indicator_targets = targets.len(),
            "universe fetched"
        );

        let mut bundles: HashMap<String, IndicatorBundle> = HashMap::new();
        for (i, symbol) in targets.iter().enumerate() {
            if i > 0 {
                sleep(self.series_pacing).await;
            }
            if let Some(closes) = self.series.fetch_closes(symbol).await {
                if let Some(bundle) = IndicatorBundle::from_closes(&closes) {
                    bundles.insert(symbol.clone(), bundle);
                }
            }
        }

        for entry in indices
            .iter_mut()
            .chain(mega_caps.iter_mut())
            .chain(sector_entries.iter_mut())
        {
            if let Some(bundle) = bundles.get(&entry.symbol) {
                entry.indicators = Some(bundle.clone());
            }
        }

        MarketSnapshot {
            indices,
            mega_caps,
            sector_entries,
            taken_at: Utc::now(),
        }
    }

    /// Fan out one group's quote fetches; entries without a usable quote
    /// are dropped here and never surface downstream
    async fn fetch_group(&self, infos: &[SymbolInfo]) -> Vec<UniverseEntry> {
        let fetches = infos.iter().map(|info| async move {
            self.quotes
                .fetch_quote(info.symbol)
                .await
                .map(|quote| UniverseEntry::new(info, quote))
        });

        join_all(fetches).await.into_iter().flatten().collect()
    }

    /// The bounded set of symbols worth a historical-series call: indices,
    /// mega caps, and the strongest movers either way
    fn indicator_targets(
        &self,
        indices: &[UniverseEntry],
        mega_caps: &[UniverseEntry],
        sector_entries: &[UniverseEntry],
    ) -> Vec<String> {
        let mut ranked: Vec<&UniverseEntry> = indices
            .iter()
            .chain(mega_caps.iter())
            .chain(sector_entries.iter())
            .filter(|e| e.quote.change_percent.is_finite())
            .collect();
        ranked.sort_by(|a, b| {
            b.quote
                .change_percent
                .partial_cmp(&a.quote.change_percent)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let top = ranked.iter().take(self.movers_per_side);
        let bottom = ranked.iter().rev().take(self.movers_per_side);

        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        for entry in indices
            .iter()
            .chain(mega_caps.iter())
            .chain(top.copied())
            .chain(bottom.copied())
        {
            if seen.insert(entry.symbol.clone()) {
                targets.push(entry.symbol.clone());
            }
        }
        targets
    }
}
