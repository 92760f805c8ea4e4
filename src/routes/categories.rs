use crate::{
    error::Result,
    models::{category::*, response::ApiResponse},
    state::AppState,
    utils::middleware::{AuthUser, JsonBody},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Category>>>> {
    let categories = state.category_service.list().await?;
    Ok(Json(ApiResponse::success(categories)))
}

async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<String>,
) -> Result<Json<ApiResponse<Category>>> {
    let category = state.category_service.get(&category_id).await?;
    Ok(Json(ApiResponse::success(category)))
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    JsonBody(request): JsonBody<CategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>)> {
    let category = state.category_service.create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(category))))
}

async fn update_category(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(category_id): Path<String>,
    JsonBody(request): JsonBody<CategoryRequest>,
) -> Result<Json<ApiResponse<Category>>> {
    let category = state
        .category_service
        .update(&user, &category_id, request)
        .await?;
    Ok(Json(ApiResponse::success(category)))
}

async fn delete_category(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(category_id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    state.category_service.delete(&user, &category_id).await?;
    Ok(Json(ApiResponse::message("Category deleted successfully")))
}
