use crate::{
    error::Result,
    models::{blog::*, response::ApiResponse},
    routes::MultipartForm,
    state::AppState,
    utils::middleware::AuthUser,
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch},
    Router,
};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_blogs).post(create_blog))
        .route("/search", get(search_blogs))
        .route("/user/:user_id", get(get_user_blogs))
        .route("/:id", get(get_blog).put(update_blog).delete(delete_blog))
        .route("/:id/content", get(get_blog_content))
        .route("/:id/like", patch(toggle_like))
}

fn blog_form(form: &MultipartForm) -> BlogForm {
    BlogForm {
        title: form.text("title").unwrap_or_default(),
        description: form.text("description").unwrap_or_default(),
        content: form.text("content").unwrap_or_default(),
        category: form.text("category").unwrap_or_default(),
    }
}

/// GET /api/blogs?category=&search=&exclude=
async fn list_blogs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BlogQuery>,
) -> Result<Json<ApiResponse<Vec<BlogDetails>>>> {
    debug!("Listing blogs with {:?}", query);
    let blogs = state.blog_service.list(query).await?;
    Ok(Json(ApiResponse::success(blogs)))
}

/// POST /api/blogs (multipart)
async fn create_blog(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<BlogDetails>>)> {
    let mut form = MultipartForm::read(multipart).await?;
    let image = form.take_file("image");

    let blog = state
        .blog_service
        .create(&user, blog_form(&form), image)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(blog, "Blog created successfully")),
    ))
}

/// GET /api/blogs/search?q=
async fn search_blogs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<BlogDetails>>>> {
    let blogs = state.blog_service.search(query).await?;
    Ok(Json(ApiResponse::success(blogs)))
}

/// GET /api/blogs/user/:user_id
async fn get_user_blogs(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<BlogDetails>>>> {
    let blogs = state.blog_service.list_by_user(&user, &user_id).await?;
    Ok(Json(ApiResponse::success(blogs)))
}

async fn get_blog(
    State(state): State<Arc<AppState>>,
    Path(blog_id): Path<String>,
) -> Result<Json<ApiResponse<BlogDetails>>> {
    let blog = state.blog_service.get(&blog_id).await?;
    Ok(Json(ApiResponse::success(blog)))
}

async fn get_blog_content(
    State(state): State<Arc<AppState>>,
    Path(blog_id): Path<String>,
) -> Result<Json<ApiResponse<BlogContent>>> {
    let content = state.blog_service.get_content(&blog_id).await?;
    Ok(Json(ApiResponse::success(content)))
}

/// PUT /api/blogs/:id (multipart，image 可选)
async fn update_blog(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(blog_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<BlogDetails>>> {
    let mut form = MultipartForm::read(multipart).await?;
    let image = form.take_file("image");

    let blog = state
        .blog_service
        .update(&user, &blog_id, blog_form(&form), image)
        .await?;
    Ok(Json(ApiResponse::success_with_message(blog, "Blog updated successfully")))
}

async fn delete_blog(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(blog_id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    state.blog_service.delete(&user, &blog_id).await?;
    Ok(Json(ApiResponse::message("Blog deleted successfully")))
}

/// PATCH /api/blogs/:id/like
async fn toggle_like(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(blog_id): Path<String>,
) -> Result<Json<ApiResponse<BlogDetails>>> {
    let blog = state.blog_service.toggle_like(&user, &blog_id).await?;
    Ok(Json(ApiResponse::success(blog)))
}
