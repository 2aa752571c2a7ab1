//! 刷新调度
//!
//! 根据运行模式决定何时拉取行情：
//! - 常驻模式：启动后立即刷新一次，之后按固定间隔后台刷新；读请求遇到空缓存或
//!   过期缓存时触发一次有时限的刷新，超时或失败时返回现有缓存
//! - 按需模式：每个读请求独立拉取，不使用缓存，超时或失败直接返回错误
//!
//! 同一时刻最多只有一次刷新在进行。

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{timeout, MissedTickBehavior};

use super::batch::BatchFetcher;
use super::cache::QuoteCache;
use super::common::{market_time, normalize_symbol};
use super::summary::summarize;
use crate::config::{ExecutionMode, QuoteConfig};
use crate::error::QuoteError;
use crate::models::{MarketSummary, Quote, QuoteDetail, Snapshot};

/// 刷新时间参数
#[derive(Debug, Clone)]
pub struct RefreshSettings {
    pub interval: Duration,
    pub stale_after: Duration,
    pub read_timeout: Duration,
    pub on_demand_timeout: Duration,
    pub symbol_suffix: String,
}

impl RefreshSettings {
    pub fn from_config(config: &QuoteConfig) -> Self {
        Self {
            interval: config.refresh_interval(),
            stale_after: config.stale_after(),
            read_timeout: config.read_refresh_timeout(),
            on_demand_timeout: config.on_demand_timeout(),
            symbol_suffix: config.symbol_suffix.clone(),
        }
    }
}

/// 单次刷新的结果
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Succeeded { count: usize, failed_batches: usize },
    Failed(String),
    TimedOut,
    /// 已有刷新在进行，本次不再发起
    Skipped,
}

pub struct RefreshScheduler {
    mode: ExecutionMode,
    universe: Vec<String>,
    batcher: BatchFetcher,
    cache: QuoteCache,
    refresh_lock: Mutex<()>,
    settings: RefreshSettings,
}

impl RefreshScheduler {
    pub fn new(
        mode: ExecutionMode,
        universe: Vec<String>,
        batcher: BatchFetcher,
        settings: RefreshSettings,
    ) -> Self {
        Self {
            mode,
            universe,
            batcher,
            cache: QuoteCache::new(),
            refresh_lock: Mutex::new(()),
            settings,
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn universe_size(&self) -> usize {
        self.universe.len()
    }

    /// 当前缓存内容，不触发刷新
    pub fn cached(&self) -> Arc<Snapshot> {
        self.cache.read()
    }

    /// 拉取一个完整周期，所有批次都失败时返回错误
    async fn run_cycle(&self) -> Result<Snapshot, QuoteError> {
        let outcome = self.batcher.fetch_all(&self.universe).await;
        if outcome.all_failed() {
            return Err(QuoteError::RefreshFailed(format!(
                "{} 个批次全部失败",
                outcome.total_batches
            )));
        }

        Ok(Snapshot {
            quotes: outcome.quotes,
            as_of: Some(Utc::now()),
            total_batches: outcome.total_batches,
            failed_batches: outcome.failed_batches,
        })
    }

    /// 调用方须持有 `refresh_lock`
    async fn refresh_locked(&self) -> RefreshOutcome {
        match self.run_cycle().await {
            Ok(snapshot) => {
                let count = snapshot.quotes.len();
                let failed_batches = snapshot.failed_batches;
                self.cache.replace(snapshot);
                log::info!(
                    "[CACHE] 行情已刷新: {} 条，失败批次 {}，时间 {}",
                    count,
                    failed_batches,
                    market_time()
                );
                RefreshOutcome::Succeeded { count, failed_batches }
            }
            Err(e) => {
                log::error!("[CACHE] 刷新行情失败: {}", e);
                RefreshOutcome::Failed(e.to_string())
            }
        }
    }

    /// 立即刷新；已有刷新在进行时直接跳过
    pub async fn refresh_now(&self) -> RefreshOutcome {
        match self.refresh_lock.try_lock() {
            Ok(_guard) => self.refresh_locked().await,
            Err(_) => {
                log::debug!("[CACHE] 已有刷新在进行，跳过本次");
                RefreshOutcome::Skipped
            }
        }
    }

    /// 在独立任务中刷新并最多等待 `limit`
    ///
    /// 等待超时后刷新任务继续执行，完成后仍会更新缓存。
    /// 已有刷新在进行时，等待其结束而不重复拉取。
    pub async fn refresh_within(self: &Arc<Self>, limit: Duration) -> RefreshOutcome {
        let this = Arc::clone(self);
        let task = tokio::spawn(async move {
            match this.refresh_lock.try_lock() {
                Ok(_guard) => this.refresh_locked().await,
                Err(_) => {
                    let _joined = this.refresh_lock.lock().await;
                    RefreshOutcome::Skipped
                }
            }
        });

        match timeout(limit, task).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                log::error!("[CACHE] 刷新任务异常退出: {}", e);
                RefreshOutcome::Failed(e.to_string())
            }
            Err(_) => {
                log::warn!("[CACHE] 刷新超过 {}ms，先返回现有缓存", limit.as_millis());
                RefreshOutcome::TimedOut
            }
        }
    }

    /// 启动后台定时刷新，仅常驻模式有效
    ///
    /// 第一次刷新立即执行
    pub fn spawn_background(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.mode != ExecutionMode::Persistent {
            return None;
        }

        let this = Arc::clone(self);
        let period = self.settings.interval.max(Duration::from_millis(1));
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                this.refresh_now().await;
            }
        }))
    }

    /// 获取全部行情
    pub async fn snapshot(self: &Arc<Self>) -> Result<Arc<Snapshot>, QuoteError> {
        match self.mode {
            ExecutionMode::Persistent => {
                if self.cache.is_stale(Utc::now(), self.settings.stale_after) {
                    let outcome = self.refresh_within(self.settings.read_timeout).await;
                    log::debug!("[CACHE] 读请求触发刷新: {:?}", outcome);
                }
                Ok(self.cache.read())
            }
            ExecutionMode::OnDemand => {
                let limit = self.settings.on_demand_timeout;
                match timeout(limit, self.run_cycle()).await {
                    Ok(result) => result.map(Arc::new),
                    Err(_) => {
                        log::warn!("按需拉取超过 {}ms", limit.as_millis());
                        Err(QuoteError::RefreshTimeout(limit))
                    }
                }
            }
        }
    }

    /// 获取市场汇总
    pub async fn summary(self: &Arc<Self>) -> Result<MarketSummary, QuoteError> {
        let snapshot = self.snapshot().await?;
        Ok(summarize(&snapshot))
    }

    /// 实时查询单只股票，不读写缓存
    pub async fn quote(&self, symbol: &str) -> Result<QuoteDetail, QuoteError> {
        let symbol = normalize_symbol(symbol, &self.settings.symbol_suffix);
        let limit = self.settings.on_demand_timeout;
        let request = [symbol.clone()];

        let raws = match timeout(limit, self.batcher.fetcher().fetch(&request)).await {
            Ok(result) => result?,
            Err(_) => return Err(QuoteError::RefreshTimeout(limit)),
        };

        let raw = raws
            .iter()
            .find(|r| r.symbol.eq_ignore_ascii_case(&symbol))
            .cloned()
            .ok_or_else(|| QuoteError::NotFound(symbol.clone()))?;

        Ok(QuoteDetail {
            quote: Quote::from_raw(&raw, self.batcher.default_currency(), &market_time()),
            raw,
        })
    }
}
