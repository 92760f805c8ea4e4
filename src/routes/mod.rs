pub mod auth;
pub mod blogs;
pub mod categories;
pub mod comments;
pub mod notifications;
pub mod users;

use crate::{
    error::{AppError, Result},
    services::media::UploadedFile,
    state::AppState,
    utils::middleware::{request_id_middleware, request_logging_middleware, security_headers_middleware},
};
use axum::{
    extract::{DefaultBodyLimit, Multipart},
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::error;

/// multipart 表单里留给文本字段的额外空间
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// 组装全部 API 路由、静态上传目录和通用中间件
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_size as usize + FORM_OVERHEAD_BYTES;
    let uploads = ServeDir::new(state.media_service.upload_dir());

    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .nest("/api/auth", auth::router())
        .nest("/api/blogs", blogs::router())
        .nest("/api/comments", comments::router())
        .nest("/api/categories", categories::router())
        .nest("/api/notifications", notifications::router())
        .nest("/api/users", users::router())
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "service": "quill-blog",
        }
    }))
}

/// 解析后的 multipart 表单：文本字段和文件分开存放
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            error!("Failed to process multipart field: {}", e);
            AppError::bad_request("Invalid multipart form data")
        })? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let data = field.bytes().await.map_err(|e| {
                        error!("Failed to read file data: {}", e);
                        AppError::FileUpload("File size too large or unreadable upload".to_string())
                    })?;
                    // 浏览器在未选择文件时也会发送空的文件字段
                    if !data.is_empty() {
                        form.files.insert(
                            name.clone(),
                            UploadedFile {
                                field_name: name,
                                file_name: Some(file_name),
                                data: data.to_vec(),
                            },
                        );
                    }
                }
                None => {
                    let value = field.text().await.map_err(|e| {
                        error!("Failed to read form field {}: {}", name, e);
                        AppError::bad_request("Invalid multipart form data")
                    })?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(
            self.fields.get(name).map(|v| v.trim().to_lowercase()).as_deref(),
            Some("true") | Some("1") | Some("on")
        )
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}
