//! 分批拉取
//!
//! 将全部股票代码按固定大小切分，依次请求上游并汇总结果。
//! 单个批次失败只记录日志并跳过，不影响其余批次。

use std::sync::Arc;
use std::time::Duration;

use super::common::market_time;
use super::provider::QuoteFetcher;
use crate::config::QuoteConfig;
use crate::models::Quote;

/// 一次分批拉取的结果
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// 按批次顺序、批内按上游返回顺序排列
    pub quotes: Vec<Quote>,
    pub total_batches: usize,
    pub failed_batches: usize,
}

impl BatchOutcome {
    /// 至少有一个批次且全部失败
    pub fn all_failed(&self) -> bool {
        self.total_batches > 0 && self.failed_batches == self.total_batches
    }
}

/// 分批拉取器
#[derive(Clone)]
pub struct BatchFetcher {
    fetcher: Arc<dyn QuoteFetcher>,
    batch_size: usize,
    delay: Duration,
    default_currency: String,
}

impl BatchFetcher {
    pub fn new(
        fetcher: Arc<dyn QuoteFetcher>,
        batch_size: usize,
        delay: Duration,
        default_currency: &str,
    ) -> Self {
        Self {
            fetcher,
            batch_size: batch_size.max(1),
            delay,
            default_currency: default_currency.to_string(),
        }
    }

    pub fn from_config(fetcher: Arc<dyn QuoteFetcher>, config: &QuoteConfig) -> Self {
        Self::new(
            fetcher,
            config.batch_size,
            config.batch_delay(),
            &config.default_currency,
        )
    }

    pub fn fetcher(&self) -> &Arc<dyn QuoteFetcher> {
        &self.fetcher
    }

    pub fn default_currency(&self) -> &str {
        &self.default_currency
    }

    /// 拉取全部股票行情
    ///
    /// 代码列表为空时直接返回，不请求上游；批次内失败不重试
    pub async fn fetch_all(&self, symbols: &[String]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        if symbols.is_empty() {
            return outcome;
        }

        let batches: Vec<&[String]> = symbols.chunks(self.batch_size).collect();
        outcome.total_batches = batches.len();

        for (i, batch) in batches.iter().enumerate() {
            match self.fetcher.fetch(batch).await {
                Ok(raws) => {
                    let captured_at = market_time();
                    outcome.quotes.extend(
                        raws.iter()
                            .map(|raw| Quote::from_raw(raw, &self.default_currency, &captured_at)),
                    );
                    log::debug!("批次 {}/{} 完成，{} 条", i + 1, outcome.total_batches, raws.len());
                }
                Err(e) => {
                    outcome.failed_batches += 1;
                    log::warn!(
                        "批次 {}/{} 拉取失败（{} ~ {}）: {}",
                        i + 1,
                        outcome.total_batches,
                        batch.first().map(String::as_str).unwrap_or(""),
                        batch.last().map(String::as_str).unwrap_or(""),
                        e
                    );
                }
            }

            if i + 1 < outcome.total_batches && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        outcome
    }
}
