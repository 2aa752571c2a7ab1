//! IDX 股票行情后端服务
//!
//! 提供印尼证券交易所（IDX）全部股票的准实时行情 RESTful API
//! 数据来源：Yahoo Finance

mod config;     // 配置加载
mod error;      // 错误类型
mod handlers;   // HTTP 请求处理器
mod middleware; // 中间件
mod models;     // 数据模型定义
mod services;   // 业务逻辑服务

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use std::env;
use std::sync::Arc;

use crate::config::{AppConfig, ConfigOrigin};
use crate::handlers::health::StartedAt;
use crate::middleware::{cors, ApiKeyMiddleware};
use crate::services::{
    BatchFetcher, RefreshScheduler, RefreshSettings, UniverseLoader, YahooQuoteFetcher,
};

/// 应用程序入口
///
/// 加载配置、股票代码列表，启动刷新调度和 HTTP 服务器
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let (mut app_config, origin) = AppConfig::load();
    app_config.apply_env(|key| env::var(key).ok());

    // 初始化日志系统，RUST_LOG 优先
    env_logger::init_from_env(Env::default().default_filter_or(app_config.log.level.as_str()));

    match origin {
        ConfigOrigin::File(path) => log::info!("从 {} 加载配置成功", path),
        ConfigOrigin::Invalid { path, error } => {
            log::warn!("加载配置文件 {} 失败: {}，使用默认配置", path, error)
        }
        ConfigOrigin::Default => log::info!("使用默认配置"),
    }

    if app_config.api.api_key.is_empty() {
        log::warn!("未设置 API_KEY，接口不启用认证");
    }

    let mode = app_config.execution_mode(|key| env::var(key).ok());
    log::info!("启动 IDX 行情服务，运行模式: {:?}", mode);

    let quotes = &app_config.quotes;
    let universe = UniverseLoader::from_config(quotes).load_or_empty();
    let fetcher = YahooQuoteFetcher::new(&quotes.provider_base_url, &app_config.api)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    let batcher = BatchFetcher::from_config(Arc::new(fetcher), quotes);
    let scheduler = Arc::new(RefreshScheduler::new(
        mode,
        universe,
        batcher,
        RefreshSettings::from_config(quotes),
    ));

    let background = scheduler.spawn_background();

    let scheduler_data = web::Data::from(scheduler);
    let started = web::Data::new(StartedAt::now());
    let api_key = app_config.api.api_key.clone();

    log::info!("监听 http://{}", app_config.bind_addr());

    // 创建并启动 HTTP 服务器
    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(scheduler_data.clone())
            .app_data(started.clone())
            .wrap(ApiKeyMiddleware::new(api_key.clone()))  // API Key 认证
            .wrap(cors())  // 跨域，位于认证外层
            .wrap(Logger::default())  // 添加请求日志中间件
            .configure(handlers::config)  // 配置路由
            .default_service(web::to(handlers::not_found))
    })
    .bind(app_config.bind_addr())?;

    if app_config.server.workers > 0 {
        server = server.workers(app_config.server.workers);
    }

    let result = server.run().await;

    if let Some(handle) = background {
        handle.abort();
    }
    result
}
