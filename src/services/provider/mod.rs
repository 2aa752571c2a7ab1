//! 行情数据源
//!
//! 定义批量行情拉取接口，具体数据源实现该 trait

mod yahoo;

#[cfg(test)]
pub mod mock;

use async_trait::async_trait;

use crate::error::QuoteError;
use crate::models::RawQuote;

pub use yahoo::YahooQuoteFetcher;

/// 行情数据源接口
///
/// 一次调用对应一次上游请求；网络或解析失败返回 [`QuoteError::Provider`]
#[async_trait]
pub trait QuoteFetcher: Send + Sync {
    async fn fetch(&self, symbols: &[String]) -> Result<Vec<RawQuote>, QuoteError>;
}
