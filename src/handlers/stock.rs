use actix_web::{web, HttpResponse, Result};

use super::error_response;
use crate::models::{ApiResponse, StockList};
use crate::services::RefreshScheduler;

pub async fn list_stocks(scheduler: web::Data<RefreshScheduler>) -> Result<HttpResponse> {
    match scheduler.into_inner().snapshot().await {
        Ok(snapshot) => {
            let response = ApiResponse::success(StockList::from(snapshot.as_ref()));
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn get_stock_info(
    scheduler: web::Data<RefreshScheduler>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner();

    match scheduler.quote(&symbol).await {
        Ok(detail) => {
            let response = ApiResponse::success(detail);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            log::warn!("查询 {} 失败: {}", symbol, e);
            Ok(error_response(&e))
        }
    }
}

pub async fn market_summary(scheduler: web::Data<RefreshScheduler>) -> Result<HttpResponse> {
    match scheduler.into_inner().summary().await {
        Ok(summary) => {
            let response = ApiResponse::success(summary);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/stocks")
            .route("", web::get().to(list_stocks))
            .route("/{symbol}", web::get().to(get_stock_info))
    )
    .route("/summary", web::get().to(market_summary));
}
