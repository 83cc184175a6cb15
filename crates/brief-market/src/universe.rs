//! The fixed symbol universe: indices, mega caps, and sector baskets
//!
//! One configurable table drives the whole run. Sector baskets deliberately
//! overlap the mega-cap set; the aggregator deduplicates before ranking.

use crate::indicators::IndicatorBundle;
use crate::quotes::Quote;
use serde::{Deserialize, Serialize};

/// Which group a symbol is fetched and reported with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Basket {
    Index,
    MegaCap,
    Sector,
}

/// One row of the static symbol table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolInfo {
    pub symbol: &'static str,
    pub name: &'static str,
    pub sector: &'static str,
    pub basket: Basket,
}

const fn index(symbol: &'static str, name: &'static str) -> SymbolInfo {
    SymbolInfo {
        symbol,
        name,
        sector: "Index",
        basket: Basket::Index,
    }
}

const fn mega(symbol: &'static str, name: &'static str, sector: &'static str) -> SymbolInfo {
    SymbolInfo {
        symbol,
        name,
        sector,
        basket: Basket::MegaCap,
    }
}

const fn stock(symbol: &'static str, name: &'static str, sector: &'static str) -> SymbolInfo {
    SymbolInfo {
        symbol,
        name,
        sector,
        basket: Basket::Sector,
    }
}

/// The three major US indices
pub const INDICES: &[SymbolInfo] = &[
    index("^GSPC", "S&P 500"),
    index("^DJI", "Dow Jones Industrial Average"),
    index("^IXIC", "Nasdaq Composite"),
];

/// The mega-cap set
pub const MEGA_CAPS: &[SymbolInfo] = &[
    mega("AAPL", "Apple", "Technology"),
    mega("MSFT", "Microsoft", "Technology"),
    mega("GOOGL", "Alphabet", "Communication Services"),
    mega("AMZN", "Amazon", "Consumer Discretionary"),
    mega("NVDA", "NVIDIA", "Technology"),
    mega("META", "Meta Platforms", "Communication Services"),
    mega("TSLA", "Tesla", "Consumer Discretionary"),
];

/// A named sector basket
#[derive(Debug, Clone, Copy)]
pub struct SectorBasket {
    pub name: &'static str,
    pub symbols: &'static [SymbolInfo],
}

/// Sector baskets of representative large caps
pub const SECTOR_BASKETS: &[SectorBasket] = &[
    SectorBasket {
        name: "Technology",
        symbols: &[
            stock("AAPL", "Apple", "Technology"),
            stock("MSFT", "Microsoft", "Technology"),
            stock("NVDA", "NVIDIA", "Technology"),
            stock("AVGO", "Broadcom", "Technology"),
            stock("ORCL", "Oracle", "Technology"),
            stock("AMD", "Advanced Micro Devices", "Technology"),
            stock("CRM", "Salesforce", "Technology"),
        ],
    },
    SectorBasket {
        name: "Communication Services",
        symbols: &[
            stock("GOOGL", "Alphabet", "Communication Services"),
            stock("META", "Meta Platforms", "Communication Services"),
            stock("NFLX", "Netflix", "Communication Services"),
            stock("DIS", "Walt Disney", "Communication Services"),
        ],
    },
    SectorBasket {
        name: "Consumer Discretionary",
        symbols: &[
            stock("AMZN", "Amazon", "Consumer Discretionary"),
            stock("TSLA", "Tesla", "Consumer Discretionary"),
            stock("HD", "Home Depot", "Consumer Discretionary"),
            stock("MCD", "McDonald's", "Consumer Discretionary"),
            stock("NKE", "Nike", "Consumer Discretionary"),
        ],
    },
    SectorBasket {
        name: "Financials",
        symbols: &[
            stock("JPM", "JPMorgan Chase", "Financials"),
            stock("BAC", "Bank of America", "Financials"),
            stock("V", "Visa", "Financials"),
            stock("MA", "Mastercard", "Financials"),
            stock("GS", "Goldman Sachs", "Financials"),
        ],
    },
    SectorBasket {
        name: "Healthcare",
        symbols: &[
            stock("UNH", "UnitedHealth", "Healthcare"),
            stock("LLY", "Eli Lilly", "Healthcare"),
            stock("JNJ", "Johnson & Johnson", "Healthcare"),
            stock("MRK", "Merck", "Healthcare"),
            stock("PFE", "Pfizer", "Healthcare"),
        ],
    },
    SectorBasket {
        name: "Energy",
        symbols: &[
            stock("XOM", "Exxon Mobil", "Energy"),
            stock("CVX", "Chevron", "Energy"),
            stock("COP", "ConocoPhillips", "Energy"),
        ],
    },
    SectorBasket {
        name: "Industrials",
        symbols: &[
            stock("CAT", "Caterpillar", "Industrials"),
            stock("BA", "Boeing", "Industrials"),
            stock("GE", "GE Aerospace", "Industrials"),
            stock("UPS", "United Parcel Service", "Industrials"),
        ],
    },
    SectorBasket {
        name: "Consumer Staples",
        symbols: &[
            stock("WMT", "Walmart", "Consumer Staples"),
            stock("COST", "Costco", "Consumer Staples"),
            stock("PG", "Procter & Gamble", "Consumer Staples"),
            stock("KO", "Coca-Cola", "Consumer Staples"),
        ],
    },
];

/// One symbol's state within a run: static identity plus the fetched data
///
/// Entries are built fresh each run and discarded with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseEntry {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub basket: Basket,
    pub quote: Quote,
    pub indicators: Option<IndicatorBundle>,
}

impl UniverseEntry {
    /// Pair a symbol-table row with its fetched quote
    pub fn new(info: &SymbolInfo, quote: Quote) -> Self {
        Self {
            symbol: info.symbol.to_string(),
            // Prefer the provider's display name when it sent one
            name: quote
                .name
                .clone()
                .unwrap_or_else(|| info.name.to_string()),
            sector: info.sector.to_string(),
            basket: info.basket,
            quote,
            indicators: None,
        }
    }
}
