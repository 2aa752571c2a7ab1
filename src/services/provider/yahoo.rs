//! Yahoo Finance 行情接口实现
//!
//! 对接 https://query1.finance.yahoo.com/v7/finance/quote
//!
//! 该接口要求会话 Cookie 与 crumb：先访问 fc.yahoo.com 获取 Cookie（由客户端的
//! cookie store 保存），再请求 /v1/test/getcrumb。crumb 缓存复用，被拒绝（401/403）
//! 时重新获取并重试一次。

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

use super::QuoteFetcher;
use crate::config::ApiConfig;
use crate::error::QuoteError;
use crate::models::RawQuote;

const QUOTE_PATH: &str = "/v7/finance/quote";
const CRUMB_PATH: &str = "/v1/test/getcrumb";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteEnvelope {
    quote_response: QuoteResponse,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    result: Vec<RawQuote>,
    #[serde(default)]
    error: Option<ProviderFault>,
}

#[derive(Debug, Deserialize)]
struct ProviderFault {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

/// Yahoo Finance 行情数据源
pub struct YahooQuoteFetcher {
    client: Client,
    endpoint: Url,
    crumb_endpoint: Url,
    crumb: Mutex<Option<String>>,
}

impl YahooQuoteFetcher {
    pub fn new(base_url: &str, api: &ApiConfig) -> Result<Self, QuoteError> {
        let base = Url::parse(base_url)?;
        let endpoint = base.join(QUOTE_PATH)?;
        let crumb_endpoint = base.join(CRUMB_PATH)?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .gzip(true)
            .cookie_store(true)
            .timeout(Duration::from_secs(api.timeout_secs))
            .connect_timeout(Duration::from_secs(api.connect_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            crumb_endpoint,
            crumb: Mutex::new(None),
        })
    }

    fn quote_url(&self, symbols: &[String], crumb: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("symbols", &symbols.join(","))
            .append_pair("crumb", crumb);
        url
    }

    /// 取缓存的 crumb，没有时完成一次握手
    ///
    /// 握手期间持有锁，并发批次共用同一次握手结果
    async fn crumb(&self, renew: bool) -> Result<String, QuoteError> {
        let mut cached = self.crumb.lock().await;
        if !renew {
            if let Some(crumb) = cached.as_ref() {
                return Ok(crumb.clone());
            }
        }

        // fc.yahoo.com 通常返回 404，只需要响应里的 Set-Cookie
        self.client.get(COOKIE_URL).send().await?;

        let response = self
            .client
            .get(self.crumb_endpoint.clone())
            .header("Referer", "https://finance.yahoo.com/")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(QuoteError::Provider(format!(
                "获取 crumb 失败: {}",
                response.status()
            )));
        }

        let crumb = parse_crumb(&response.text().await?)?;
        log::debug!("已获取 Yahoo crumb");
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    async fn request(&self, symbols: &[String], crumb: &str) -> Result<reqwest::Response, QuoteError> {
        let response = self
            .client
            .get(self.quote_url(symbols, crumb))
            .header("Referer", "https://finance.yahoo.com/")
            .send()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl QuoteFetcher for YahooQuoteFetcher {
    async fn fetch(&self, symbols: &[String]) -> Result<Vec<RawQuote>, QuoteError> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }

        let crumb = self.crumb(false).await?;
        let mut response = self.request(symbols, &crumb).await?;

        if is_crumb_rejected(response.status()) {
            log::warn!("Yahoo crumb 已失效（{}），重新获取", response.status());
            let crumb = self.crumb(true).await?;
            response = self.request(symbols, &crumb).await?;
        }

        if !response.status().is_success() {
            return Err(QuoteError::Provider(format!(
                "获取行情数据失败: {}",
                response.status()
            )));
        }

        let text = response.text().await?;
        parse_quote_response(&text)
    }
}

fn is_crumb_rejected(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// crumb 是一段不含空白的短字符串；限流时上游会返回提示文本或 HTML
fn parse_crumb(text: &str) -> Result<String, QuoteError> {
    let crumb = text.trim();
    if crumb.is_empty() || crumb.len() > 64 || crumb.contains(char::is_whitespace) || crumb.contains('<') {
        return Err(QuoteError::Provider(format!("无效的 crumb 响应: {:.40}", crumb)));
    }
    Ok(crumb.to_string())
}

/// 解析行情响应，上游返回错误时转换为 [`QuoteError::Provider`]
fn parse_quote_response(text: &str) -> Result<Vec<RawQuote>, QuoteError> {
    let envelope: QuoteEnvelope = serde_json::from_str(text)
        .map_err(|e| QuoteError::Provider(format!("解析行情数据失败: {}", e)))?;

    if let Some(fault) = envelope.quote_response.error {
        return Err(QuoteError::Provider(format!("{} {}", fault.code, fault.description)));
    }

    Ok(envelope.quote_response.result)
}
