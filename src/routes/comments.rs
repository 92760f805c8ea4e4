use crate::{
    error::Result,
    models::{comment::*, response::ApiResponse},
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
        .route("/", get(list_all_comments).post(create_comment))
        // GET 的参数是博客 ID，DELETE 的参数是评论 ID
        .route("/:id", get(get_blog_comments).delete(delete_comment))
}

async fn create_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    JsonBody(request): JsonBody<CreateCommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CommentWithAuthor>>)> {
    let comment = state.comment_service.create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(comment))))
}

/// 管理员查看全部评论
async fn list_all_comments(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<ApiResponse<Vec<CommentWithAuthor>>>> {
    let comments = state.comment_service.list_all(&user).await?;
    Ok(Json(ApiResponse::success(comments)))
}

async fn get_blog_comments(
    State(state): State<Arc<AppState>>,
    Path(blog_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<CommentWithAuthor>>>> {
    let comments = state.comment_service.list_for_blog(&blog_id).await?;
    Ok(Json(ApiResponse::success(comments)))
}

async fn delete_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(comment_id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    state.comment_service.delete(&user, &comment_id).await?;
    Ok(Json(ApiResponse::message("Comment deleted successfully")))
}
