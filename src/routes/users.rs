use crate::{
    error::Result,
    models::{blog::BlogDetails, response::ApiResponse, user::*},
    routes::MultipartForm,
    state::AppState,
    utils::middleware::AuthUser,
};
use axum::{
    extract::{Multipart, Path, State},
    response::Json,
    routing::{get, patch},
    Router,
};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_users))
        .route("/:id/blogs", get(get_user_blogs))
        .route("/:id", patch(update_user).delete(delete_user))
}

/// GET /api/users
async fn list_users(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>> {
    debug!("User {} listing users", user.id);
    let users = state.user_service.list_users().await?;
    Ok(Json(ApiResponse::success(users)))
}

/// GET /api/users/:id/blogs（公开）
async fn get_user_blogs(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<BlogDetails>>>> {
    let blogs = state.blog_service.public_by_user(&user_id).await?;
    Ok(Json(ApiResponse::success(blogs)))
}

/// PATCH /api/users/:id (multipart: name, email, profileImage, removeProfileImage)
async fn update_user(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(user_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<UserResponse>>> {
    let mut form = MultipartForm::read(multipart).await?;
    let profile_image = form.take_file("profileImage");

    let request = UpdateUserRequest {
        name: form.text("name"),
        email: form.text("email"),
        remove_profile_image: form.flag("removeProfileImage"),
    };

    let updated = state
        .user_service
        .update_user(&user, &user_id, request, profile_image)
        .await?;
    Ok(Json(ApiResponse::success_with_message(updated, "Profile updated successfully")))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    state.user_service.delete_user(&user, &user_id).await?;
    Ok(Json(ApiResponse::message("User deleted successfully")))
}
