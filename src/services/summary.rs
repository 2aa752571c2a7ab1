//! 市场汇总统计
//!
//! 每次请求时从快照重新计算，不单独缓存

use std::cmp::Ordering;

use crate::models::{MarketSummary, Quote, Snapshot};

const TOP_N: usize = 5;

/// 按指定比较规则稳定排序后取前 N 条，相等时保持快照顺序
fn top_by<F>(quotes: Vec<&Quote>, compare: F) -> Vec<Quote>
where
    F: Fn(&Quote, &Quote) -> Ordering,
{
    let mut quotes = quotes;
    quotes.sort_by(|a, b| compare(a, b));
    quotes.into_iter().take(TOP_N).cloned().collect()
}

fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

pub fn summarize(snapshot: &Snapshot) -> MarketSummary {
    let quotes = &snapshot.quotes;

    let gainers: Vec<&Quote> = quotes.iter().filter(|q| q.change > 0.0).collect();
    let losers: Vec<&Quote> = quotes.iter().filter(|q| q.change < 0.0).collect();
    let unchanged = quotes.iter().filter(|q| q.change == 0.0).count();

    MarketSummary {
        total_stocks: quotes.len(),
        total_market_cap: quotes.iter().map(|q| q.market_cap).sum(),
        gainers: gainers.len(),
        losers: losers.len(),
        unchanged,
        top_gainers: top_by(gainers, |a, b| desc(a.change_percent, b.change_percent)),
        top_losers: top_by(losers, |a, b| desc(b.change_percent, a.change_percent)),
        most_active: top_by(quotes.iter().collect(), |a, b| b.volume.cmp(&a.volume)),
        last_update: snapshot.as_of,
    }
}
