//! 股票行情数据模型
//!
//! 定义上游原始行情、缓存快照及汇总统计的数据结构

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 上游未提供名称时使用的占位值
pub const UNKNOWN_NAME: &str = "N/A";

/// 上游原始行情记录
///
/// 字段名与数据源保持一致，未识别的字段保存在 `extra` 中原样返回
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuote {
    #[serde(default)]
    pub symbol: String,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub currency: Option<String>,
    pub regular_market_price: Option<f64>,
    pub regular_market_change: Option<f64>,
    pub regular_market_change_percent: Option<f64>,
    pub regular_market_volume: Option<f64>,
    pub market_cap: Option<f64>,
    pub regular_market_day_high: Option<f64>,
    pub regular_market_day_low: Option<f64>,
    pub regular_market_open: Option<f64>,
    pub regular_market_previous_close: Option<f64>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// 单只股票行情
///
/// 构造后不可变，每次拉取都会生成全新的记录
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Quote {
    /// 股票代码
    pub symbol: String,
    /// 股票名称
    pub name: String,
    /// 当前价格
    pub price: f64,
    /// 涨跌额
    pub change: f64,
    /// 涨跌幅（百分比）
    pub change_percent: f64,
    /// 成交量
    pub volume: u64,
    /// 市值
    pub market_cap: f64,
    /// 币种
    pub currency: String,
    /// 最高价
    pub day_high: f64,
    /// 最低价
    pub day_low: f64,
    /// 开盘价
    pub open: f64,
    /// 昨收价
    pub previous_close: f64,
    /// 采集时间
    pub last_updated: String,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl Quote {
    /// 从原始记录转换，缺失的数值字段置 0
    pub fn from_raw(raw: &RawQuote, default_currency: &str, captured_at: &str) -> Self {
        let name = non_blank(&raw.short_name)
            .or_else(|| non_blank(&raw.long_name))
            .unwrap_or(UNKNOWN_NAME)
            .to_string();

        Self {
            symbol: raw.symbol.clone(),
            name,
            price: raw.regular_market_price.unwrap_or(0.0),
            change: raw.regular_market_change.unwrap_or(0.0),
            change_percent: raw.regular_market_change_percent.unwrap_or(0.0),
            volume: raw.regular_market_volume.map(|v| v.max(0.0) as u64).unwrap_or(0),
            market_cap: raw.market_cap.unwrap_or(0.0),
            currency: raw
                .currency
                .clone()
                .unwrap_or_else(|| default_currency.to_string()),
            day_high: raw.regular_market_day_high.unwrap_or(0.0),
            day_low: raw.regular_market_day_low.unwrap_or(0.0),
            open: raw.regular_market_open.unwrap_or(0.0),
            previous_close: raw.regular_market_previous_close.unwrap_or(0.0),
            last_updated: captured_at.to_string(),
        }
    }
}

/// 行情快照
///
/// 一次完整拉取周期的结果，整体替换，不会被部分修改
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    /// 按批次顺序排列的行情
    pub quotes: Vec<Quote>,
    /// 快照时间，首次成功拉取前为空
    pub as_of: Option<DateTime<Utc>>,
    /// 本周期批次总数
    pub total_batches: usize,
    /// 本周期失败的批次数
    pub failed_batches: usize,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

/// 股票列表响应数据
#[derive(Debug, Serialize, Deserialize)]
pub struct StockList {
    pub count: usize,
    pub last_update: Option<DateTime<Utc>>,
    pub total_batches: usize,
    pub failed_batches: usize,
    pub stocks: Vec<Quote>,
}

impl From<&Snapshot> for StockList {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            count: snapshot.quotes.len(),
            last_update: snapshot.as_of,
            total_batches: snapshot.total_batches,
            failed_batches: snapshot.failed_batches,
            stocks: snapshot.quotes.clone(),
        }
    }
}

/// 单只股票查询结果，附带上游原始数据
#[derive(Debug, Serialize)]
pub struct QuoteDetail {
    pub quote: Quote,
    pub raw: RawQuote,
}

/// 市场汇总
#[derive(Debug, Serialize, Deserialize)]
pub struct MarketSummary {
    /// 股票总数
    pub total_stocks: usize,
    /// 总市值
    pub total_market_cap: f64,
    /// 上涨家数
    pub gainers: usize,
    /// 下跌家数
    pub losers: usize,
    /// 平盘家数
    pub unchanged: usize,
    /// 涨幅前五
    pub top_gainers: Vec<Quote>,
    /// 跌幅前五
    pub top_losers: Vec<Quote>,
    /// 成交量前五
    pub most_active: Vec<Quote>,
    /// 快照时间
    pub last_update: Option<DateTime<Utc>>,
}

/// 健康检查结果
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    /// 运行时长（秒）
    pub uptime_secs: f64,
}
