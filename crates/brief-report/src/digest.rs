//! Structured digest and prompt construction
//!
//! The digest is the only numeric source the model is allowed to draw on;
//! the prompt pins the output format to Telegram-safe HTML.

use brief_market::{Aggregation, IndicatorBundle, MarketSnapshot, Quote, RsiFlag, UniverseEntry};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// How many movers each ranking list shows
pub const MOVERS_SHOWN: usize = 5;

const DIVIDER: &str = "────────────────────────";

/// System prompt for the report model
pub const SYSTEM_PROMPT: &str = "You are a senior US equity market analyst who writes clear, \
    readable daily market reports for a general investing audience.";

/// Render the per-run digest the model writes its report from
pub fn render_digest(snapshot: &MarketSnapshot, aggregation: &Aggregation) -> String {
    let mut out = String::new();

    out.push_str("INDICES\n");
    for entry in &snapshot.indices {
        let _ = writeln!(out, "{}", index_line(entry));
    }

    out.push_str("\nMEGA CAPS\n");
    for entry in &snapshot.mega_caps {
        let _ = writeln!(out, "{}", stock_line(entry));
    }

    out.push_str("\nTOP MOVERS\n");
    for (i, entry) in aggregation.top_movers(MOVERS_SHOWN).iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, mover_line(entry));
    }

    out.push_str("\nBOTTOM MOVERS\n");
    for (i, entry) in aggregation.bottom_movers(MOVERS_SHOWN).iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, mover_line(entry));
    }

    out.push_str("\nSECTOR PERFORMANCE (average % change)\n");
    for (sector, avg, count) in sector_performance(snapshot) {
        let _ = writeln!(out, "{sector}: {} ({count} symbols)", fmt_signed_pct(avg));
    }

    if !aggregation.earnings.is_empty() {
        out.push_str("\nEARNINGS NEXT 7 DAYS\n");
        for event in &aggregation.earnings {
            let _ = writeln!(
                out,
                "{} {} - {}",
                event.symbol,
                event.name,
                event.when.format("%Y-%m-%d %H:%M UTC")
            );
        }
    }

    out
}

/// Build the user prompt around a digest
pub fn build_prompt(digest: &str, date: &str) -> String {
    format!(
        "Write the US market daily report for {date} using ONLY the data in the \
digest below.\n\n\
Report sections, in order:\n\
1. Major index overview (close, change, position in the 52-week range)\n\
2. Mega-cap moves\n\
3. Sector rotation (strong and weak sectors)\n\
4. Technical picture (RSI, moving averages, Bollinger position where given)\n\
5. Near-term outlook: bull, bear, and neutral scenarios\n\
6. Risk watch (upcoming earnings if listed in the digest)\n\n\
Formatting rules:\n\
- Output Telegram-compatible HTML only; the permitted tags are <b>, <i> and <code>\n\
- Start every section with a heading line that begins with <b> and opens with an emoji\n\
- Leave exactly one blank line between sections\n\
- Use only numbers that appear in the digest; never invent support or resistance price levels\n\
- If the digest has no earnings section, skip the earnings part of risk watch\n\
- Do not add a title line or a disclaimer; both are added outside the report\n\n\
DIGEST\n\
{digest}"
    )
}

/// Wrap the generated body with the dated header and disclaimer footer
pub fn frame_report(body: &str, date: &str) -> String {
    format!(
        "📈 <b>US Market Daily | {date}</b>\n{DIVIDER}\n\n{}\n\n{DIVIDER}\n\
🤖 Generated automatically · Investing involves risk, this report is for reference only",
        body.trim()
    )
}

fn index_line(entry: &UniverseEntry) -> String {
    let quote = &entry.quote;
    let mut line = format!(
        "{} {}: {:.2} ({} / {})",
        entry.symbol,
        entry.name,
        quote.price,
        fmt_signed(quote.change),
        fmt_signed_pct(quote.change_percent)
    );

    if let Some(position) = week52_position(quote) {
        let _ = write!(line, " | 52w range position {position:.0}%");
    }
    if let Some(indicators) = &entry.indicators {
        let _ = write!(line, "{}", indicator_suffix(indicators));
    }
    line
}

fn stock_line(entry: &UniverseEntry) -> String {
    let quote = &entry.quote;
    let mut line = format!(
        "{} {}: {:.2} ({})",
        entry.symbol,
        entry.name,
        quote.price,
        fmt_signed_pct(quote.change_percent)
    );

    if let Some(volume) = quote.volume {
        let _ = write!(line, " | vol {}", fmt_count(volume));
        if let Some(avg) = quote.average_volume {
            let _ = write!(line, " (avg {})", fmt_count(avg));
        }
    }
    if let Some(cap) = quote.market_cap {
        let _ = write!(line, " | mcap {}", fmt_market_cap(cap));
    }
    if let Some(indicators) = &entry.indicators {
        let _ = write!(line, "{}", indicator_suffix(indicators));
    }
    line
}

fn mover_line(entry: &UniverseEntry) -> String {
    format!(
        "{} {} {} ({})",
        entry.symbol,
        entry.name,
        fmt_signed_pct(entry.quote.change_percent),
        entry.sector
    )
}

fn indicator_suffix(indicators: &IndicatorBundle) -> String {
    let mut suffix = String::new();
    if let Some(rsi) = indicators.rsi14 {
        let _ = write!(suffix, " | RSI14 {rsi:.1}");
        match indicators.rsi_flag {
            RsiFlag::Overbought => suffix.push_str(" (overbought)"),
            RsiFlag::Oversold => suffix.push_str(" (oversold)"),
            RsiFlag::Neutral => {}
        }
    }
    if let Some(offset) = indicators.ma20_offset_pct {
        let _ = write!(suffix, " | vs MA20 {}", fmt_signed_pct(offset));
    }
    if let Some(offset) = indicators.ma50_offset_pct {
        let _ = write!(suffix, " | vs MA50 {}", fmt_signed_pct(offset));
    }
    if let Some(percent_b) = indicators.bollinger_percent {
        let _ = write!(suffix, " | %B {percent_b:.0}");
    }
    suffix
}

/// Average percent change per sector, best first
fn sector_performance(snapshot: &MarketSnapshot) -> Vec<(String, f64, usize)> {
    let mut by_sector: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for entry in &snapshot.sector_entries {
        let slot = by_sector.entry(entry.sector.as_str()).or_insert((0.0, 0));
        slot.0 += entry.quote.change_percent;
        slot.1 += 1;
    }

    let mut rows: Vec<(String, f64, usize)> = by_sector
        .into_iter()
        .map(|(sector, (sum, count))| (sector.to_string(), sum / count as f64, count))
        .collect();
    rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    rows
}

/// Position of the price within the 52-week range, as a percentage
fn week52_position(quote: &Quote) -> Option<f64> {
    let high = quote.week52_high?;
    let low = quote.week52_low?;
    if high <= low {
        return None;
    }
    Some((quote.price - low) / (high - low) * 100.0)
}

fn fmt_signed(value: f64) -> String {
    format!("{value:+.2}")
}

fn fmt_signed_pct(value: f64) -> String {
    format!("{value:+.2}%")
}

fn fmt_count(value: u64) -> String {
    let value = value as f64;
    if value >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if value >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if value >= 1e3 {
        format!("{:.1}K", value / 1e3)
    } else {
        format!("{value:.0}")
    }
}

fn fmt_market_cap(value: f64) -> String {
    if value >= 1e12 {
        format!("${:.2}T", value / 1e12)
    } else if value >= 1e9 {
        format!("${:.1}B", value / 1e9)
    } else {
        format!("${:.0}M", value / 1e6)
    }
}
