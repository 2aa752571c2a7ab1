//! 通用 API 响应模型
//!
//! 所有接口返回 `{ success, data, message, timestamp }`，
//! 时间戳为雅加达时间（ISO 8601）

use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::QuoteError;
use crate::services::market_time;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// 请求是否成功
    pub success: bool,
    /// 响应数据，失败时为空
    pub data: Option<T>,
    pub message: String,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
            timestamp: market_time(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message,
            timestamp: market_time(),
        }
    }
}

impl ApiResponse<()> {
    /// 行情错误对应的状态码与响应体
    ///
    /// 单只查询失败一律按 404 返回，并附带上游错误信息
    pub fn from_quote_error(e: &QuoteError) -> (StatusCode, Self) {
        let status = match e {
            QuoteError::NotFound(_) | QuoteError::Provider(_) => StatusCode::NOT_FOUND,
            QuoteError::RefreshTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            QuoteError::RefreshFailed(_) => StatusCode::BAD_GATEWAY,
            QuoteError::SourceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status, Self::error(e.to_string()))
    }
}
