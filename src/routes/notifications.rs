use crate::{
    error::Result,
    models::{notification::*, response::ApiResponse},
    state::AppState,
    utils::middleware::AuthUser,
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{delete, get, patch},
    Router,
};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_notifications).delete(delete_all_notifications))
        .route("/unread-count", get(unread_count))
        .route("/mark-all-read", patch(mark_all_read))
        .route("/:id/read", patch(mark_read))
        .route("/:id", delete(delete_notification))
}

async fn list_notifications(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<ApiResponse<Vec<NotificationWithSender>>>> {
    let notifications = state.notification_service.list(&user).await?;
    Ok(Json(ApiResponse::success(notifications)))
}

async fn unread_count(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<ApiResponse<UnreadCount>>> {
    let count = state.notification_service.unread_count(&user).await?;
    Ok(Json(ApiResponse::success(count)))
}

async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<ApiResponse<()>>> {
    state.notification_service.mark_all_read(&user).await?;
    Ok(Json(ApiResponse::message("All notifications marked as read")))
}

async fn mark_read(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(notification_id): Path<String>,
) -> Result<Json<ApiResponse<Notification>>> {
    let notification = state
        .notification_service
        .mark_read(&user, &notification_id)
        .await?;
    Ok(Json(ApiResponse::success(notification)))
}

async fn delete_notification(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(notification_id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    state
        .notification_service
        .delete(&user, &notification_id)
        .await?;
    Ok(Json(ApiResponse::message("Notification deleted")))
}

async fn delete_all_notifications(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<ApiResponse<()>>> {
    state.notification_service.delete_all(&user).await?;
    Ok(Json(ApiResponse::message("All notifications deleted")))
}
