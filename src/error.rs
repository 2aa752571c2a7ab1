//! 行情服务错误类型

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum QuoteError {
    /// 股票代码列表缺失或损坏
    #[error("股票代码列表不可用: {0}")]
    SourceUnavailable(String),
    /// 上游网络或解析错误
    #[error("行情数据源错误: {0}")]
    Provider(String),
    /// 上游未返回该股票
    #[error("未找到股票: {0}")]
    NotFound(String),
    /// 刷新超过等待上限
    #[error("行情刷新超时（{}ms）", .0.as_millis())]
    RefreshTimeout(Duration),
    /// 所有批次均失败
    #[error("行情刷新失败: {0}")]
    RefreshFailed(String),
}

impl From<reqwest::Error> for QuoteError {
    fn from(e: reqwest::Error) -> Self {
        QuoteError::Provider(e.to_string())
    }
}

impl From<url::ParseError> for QuoteError {
    fn from(e: url::ParseError) -> Self {
        QuoteError::Provider(format!("数据源地址无效: {}", e))
    }
}
