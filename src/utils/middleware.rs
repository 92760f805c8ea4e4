use crate::{error::AppError, models::user::UserResponse, state::AppState};
use async_trait::async_trait;
use axum::{
    body::{Body, HttpBody},
    extract::{FromRequest, FromRequestParts},
    headers::{authorization::Bearer, Authorization},
    http::{request::Parts, HeaderValue, Request},
    middleware::Next,
    response::Response,
    BoxError, Json, RequestPartsExt, TypedHeader,
};
use serde::de::DeserializeOwned;
use std::{net::SocketAddr, sync::Arc};
use tracing::{debug, info, warn};

/// 已认证的用户；处理器声明这个参数即要求携带有效的 Bearer 令牌
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserResponse);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // 从请求头中提取 Authorization
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| {
                debug!("Missing bearer token for {}", parts.uri.path());
                AppError::unauthorized("Unauthorized - No token provided")
            })?;

        let user = state.auth_service.authenticate(bearer.token()).await?;
        debug!("Authenticated user: {} ({})", user.id, user.role.as_str());
        Ok(AuthUser(user))
    }
}

/// JSON 请求体；缺字段或类型错误时返回 400 和统一的错误信封
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S, B> FromRequest<S, B> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
    B: HttpBody + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Rejection = AppError;

    async fn from_request(request: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state)
            .await
            .map_err(|rejection| {
                debug!("Rejected JSON body: {}", rejection.body_text());
                AppError::from(rejection)
            })?;
        Ok(JsonBody(value))
    }
}

/// 请求日志中间件
pub async fn request_logging_middleware(request: Request<Body>, next: Next<Body>) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let client_ip = get_client_ip(&request);
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_else(|| "-".to_string());

    let start_time = std::time::Instant::now();

    debug!("Incoming request [{}]: {} {} from {}", request_id, method, uri, client_ip);

    let response = next.run(request).await;

    let elapsed = start_time.elapsed();
    let status = response.status();

    if status.is_server_error() {
        warn!(
            "Request failed [{}]: {} {} {} - {}ms",
            request_id,
            method,
            uri,
            status.as_u16(),
            elapsed.as_millis()
        );
    } else {
        info!(
            "Request completed [{}]: {} {} {} - {}ms",
            request_id,
            method,
            uri,
            status.as_u16(),
            elapsed.as_millis()
        );
    }

    response
}

/// 请求 ID 中间件，需挂在日志中间件外层
pub async fn request_id_middleware(mut request: Request<Body>, next: Next<Body>) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();

    // 添加到请求扩展中
    request.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    // 添加到响应头中
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}

/// 安全头中间件
pub async fn security_headers_middleware(request: Request<Body>, next: Next<Body>) -> Response {
    let is_https = is_https_request(&request);
    let mut response = next.run(request).await;

    let headers = response.headers_mut();

    headers.insert("x-content-type-options", HeaderValue::from_static("nosniff"));
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    if is_https {
        headers.insert(
            "strict-transport-security",
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    response
}

/// 获取客户端 IP 地址
fn get_client_ip(request: &Request<Body>) -> String {
    let headers = request.headers();

    // 检查常见的代理头
    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
    {
        return ip.trim().to_string();
    }

    if let Some(ip) = headers.get("x-real-ip").and_then(|h| h.to_str().ok()) {
        return ip.to_string();
    }

    request
        .extensions()
        .get::<SocketAddr>()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// 检查请求是否为 HTTPS
fn is_https_request(request: &Request<Body>) -> bool {
    if request.uri().scheme_str() == Some("https") {
        return true;
    }

    request
        .headers()
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .map_or(false, |proto| proto == "https")
}

/// 请求 ID 包装器
#[derive(Debug, Clone)]
pub struct RequestId(pub String);
