use actix_web::{web, HttpResponse, Result};
use std::time::Instant;

use crate::models::{ApiResponse, HealthStatus};

/// 服务启动时间
pub struct StartedAt(pub Instant);

impl StartedAt {
    pub fn now() -> Self {
        Self(Instant::now())
    }
}

pub async fn health_check(started: web::Data<StartedAt>) -> Result<HttpResponse> {
    let response = ApiResponse::success(HealthStatus {
        status: "OK".to_string(),
        uptime_secs: started.0.elapsed().as_secs_f64(),
    });
    Ok(HttpResponse::Ok().json(response))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
