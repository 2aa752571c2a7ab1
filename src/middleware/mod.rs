mod api_key;

use actix_cors::Cors;

pub use api_key::ApiKeyMiddleware;

/// 跨域配置，允许任意来源
///
/// 需包在 [`ApiKeyMiddleware`] 外层，预检请求不携带 Authorization，由此直接应答
pub fn cors() -> Cors {
    Cors::permissive()
}
