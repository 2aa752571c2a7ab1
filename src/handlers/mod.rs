pub mod stock;
pub mod health;

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::QuoteError;
use crate::models::ApiResponse;
use crate::services::RefreshScheduler;

/// 将行情错误转换为统一响应
pub fn error_response(e: &QuoteError) -> HttpResponse {
    let (status, body) = ApiResponse::from_quote_error(e);
    HttpResponse::build(status).json(body)
}

pub async fn index(scheduler: web::Data<RefreshScheduler>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(json!({
        "name": "IDX Stock Market API",
        "mode": scheduler.mode(),
        "universe": scheduler.universe_size(),
        "last_update": scheduler.cached().as_of,
        "endpoints": {
            "all_stocks": "/api/stocks",
            "single_stock": "/api/stocks/{symbol}",
            "market_summary": "/api/summary",
            "health": "/api/health"
        }
    })))
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<()>::error("接口不存在".to_string()))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .service(
            web::scope("/api")
                .configure(health::config)
                .configure(stock::config)
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutionMode;
    use crate::models::{HealthStatus, MarketSummary, StockList};
    use crate::services::provider::mock::ScriptedFetcher;
    use crate::services::{BatchFetcher, RefreshSettings};
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;

    fn scheduler(mode: ExecutionMode, fetcher: ScriptedFetcher, on_demand_ms: u64) -> Arc<RefreshScheduler> {
        let settings = RefreshSettings {
            interval: Duration::from_secs(60),
            stale_after: Duration::from_secs(300),
            read_timeout: Duration::from_secs(2),
            on_demand_timeout: Duration::from_millis(on_demand_ms),
            symbol_suffix: ".JK".to_string(),
        };
        let batcher = BatchFetcher::new(Arc::new(fetcher), 50, Duration::ZERO, "IDR");
        let universe = vec!["BBCA.JK".to_string(), "TLKM.JK".to_string()];
        Arc::new(RefreshScheduler::new(mode, universe, batcher, settings))
    }

    macro_rules! app {
        ($scheduler:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::from($scheduler))
                    .app_data(web::Data::new(health::StartedAt::now()))
                    .configure(config)
                    .default_service(web::to(not_found)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_list_stocks() {
        let app = app!(scheduler(ExecutionMode::Persistent, ScriptedFetcher::new(), 1000));
        let req = test::TestRequest::get().uri("/api/stocks").to_request();
        let body: ApiResponse<StockList> = test::call_and_read_body_json(&app, req).await;

        assert!(body.success);
        let list = body.data.unwrap();
        assert_eq!(list.count, 2);
        assert_eq!(list.failed_batches, 0);
        assert!(list.last_update.is_some());
    }

    #[actix_web::test]
    async fn test_summary() {
        let app = app!(scheduler(ExecutionMode::Persistent, ScriptedFetcher::new(), 1000));
        let req = test::TestRequest::get().uri("/api/summary").to_request();
        let body: ApiResponse<MarketSummary> = test::call_and_read_body_json(&app, req).await;

        let summary = body.data.unwrap();
        assert_eq!(summary.total_stocks, 2);
        assert_eq!(summary.unchanged, 2);
    }

    #[actix_web::test]
    async fn test_single_stock_not_found() {
        let fetcher = ScriptedFetcher::new().rejecting(&["ZZZZ.JK"]);
        let app = app!(scheduler(ExecutionMode::Persistent, fetcher, 1000));
        let req = test::TestRequest::get().uri("/api/stocks/zzzz").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("ZZZZ.JK"));
    }

    #[actix_web::test]
    async fn test_single_stock_found() {
        let app = app!(scheduler(ExecutionMode::Persistent, ScriptedFetcher::new(), 1000));
        let req = test::TestRequest::get().uri("/api/stocks/bbca").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"]["quote"]["symbol"], "BBCA.JK");
        assert_eq!(body["data"]["raw"]["symbol"], "BBCA.JK");
    }

    #[actix_web::test]
    async fn test_on_demand_timeout_is_gateway_timeout() {
        let fetcher = ScriptedFetcher::new().with_delay(Duration::from_secs(5));
        let app = app!(scheduler(ExecutionMode::OnDemand, fetcher, 50));
        let req = test::TestRequest::get().uri("/api/stocks").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[actix_web::test]
    async fn test_health_and_unknown_route() {
        let app = app!(scheduler(ExecutionMode::Persistent, ScriptedFetcher::new(), 1000));

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: ApiResponse<HealthStatus> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.data.unwrap().status, "OK");

        let req = test::TestRequest::get().uri("/api/nope").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_index_lists_mode() {
        let app = app!(scheduler(ExecutionMode::OnDemand, ScriptedFetcher::new(), 1000));
        let req = test::TestRequest::get().uri("/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"]["mode"], "on_demand");
        assert_eq!(body["data"]["universe"], 2);
    }
}
