//! 行情接口认证
//!
//! `/api/stocks`、`/api/summary` 需要 `Authorization: Bearer <API_KEY>`；
//! 首页与 `/api/health` 供探活使用，始终公开。未配置 API_KEY 时不做认证。

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpResponse,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::models::ApiResponse;

/// 公开路径，按完整路径匹配
const PUBLIC_PATHS: [&str; 2] = ["/", "/api/health"];

pub struct ApiKeyMiddleware {
    api_key: Rc<String>,
}

impl ApiKeyMiddleware {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key: Rc::new(api_key),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = ApiKeyMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(ApiKeyMiddlewareService {
            service: Rc::new(service),
            api_key: self.api_key.clone(),
        })
    }
}

pub struct ApiKeyMiddlewareService<S> {
    service: Rc<S>,
    api_key: Rc<String>,
}

fn is_public(api_key: &str, path: &str) -> bool {
    api_key.is_empty() || PUBLIC_PATHS.contains(&path)
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

/// 401 响应，附带 Bearer 质询头
fn unauthorized(path: &str) -> HttpResponse {
    HttpResponse::Unauthorized()
        .insert_header((header::WWW_AUTHENTICATE, r#"Bearer realm="idx-quotes""#))
        .json(ApiResponse::<()>::error(format!(
            "访问 {} 需要有效的 API Key（Authorization: Bearer <API_KEY>）",
            path
        )))
}

impl<S, B> Service<ServiceRequest> for ApiKeyMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let api_key = self.api_key.clone();

        Box::pin(async move {
            let authorized = is_public(&api_key, req.path())
                || bearer_token(&req) == Some(api_key.as_str());

            if authorized {
                let res = service.call(req).await?;
                return Ok(res.map_into_left_body());
            }

            log::debug!("拒绝未认证请求: {} {}", req.method(), req.path());
            let response = unauthorized(req.path());
            Ok(req.into_response(response).map_into_right_body())
        })
    }
}
