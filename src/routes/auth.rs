use crate::{
    error::Result,
    models::{response::ApiResponse, user::*},
    state::AppState,
    utils::middleware::{AuthUser, JsonBody},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(get_current_user))
}

/// 注册
/// POST /api/auth/register
pub async fn register(
    State(app_state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    let response = app_state.auth_service.register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(response, "User registered successfully")),
    ))
}

/// 登录
/// POST /api/auth/login
pub async fn login(
    State(app_state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>> {
    let response = app_state.auth_service.login(request).await?;
    Ok(Json(ApiResponse::success(response)))
}

/// 获取当前用户信息
/// GET /api/auth/me
pub async fn get_current_user(AuthUser(user): AuthUser) -> Json<ApiResponse<UserResponse>> {
    debug!("Getting current user info for user: {}", user.id);
    Json(ApiResponse::success(user))
}
