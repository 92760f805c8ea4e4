#![allow(dead_code)]

use quill_blog::{
    models::{
        blog::{BlogDetails, BlogForm},
        category::{Category, CategoryRequest},
        user::{Role, RegisterRequest, UserResponse},
    },
    services::media::UploadedFile,
    AppState, Config,
};
use std::sync::Arc;
use tempfile::TempDir;

pub const PNG: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// 每个测试一个独立的内存数据库和上传目录
pub struct TestApp {
    pub state: Arc<AppState>,
    pub uploads: TempDir,
}

pub async fn spawn_app() -> TestApp {
    let uploads = tempfile::tempdir().unwrap();
    let config = Config {
        upload_dir: uploads.path().to_string_lossy().into_owned(),
        ..Config::default()
    };
    let state = Arc::new(AppState::build(config).await.unwrap());
    TestApp { state, uploads }
}

impl TestApp {
    pub async fn register(&self, username: &str, role: Role) -> (String, UserResponse) {
        let response = self
            .state
            .auth_service
            .register(RegisterRequest {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password: "secret123".to_string(),
                name: Some(username.to_uppercase()),
                role: Some(role),
            })
            .await
            .unwrap();
        (response.token, response.user)
    }

    pub async fn user(&self, username: &str) -> UserResponse {
        self.register(username, Role::User).await.1
    }

    pub async fn admin(&self, username: &str) -> UserResponse {
        self.register(username, Role::Admin).await.1
    }

    pub async fn category(&self, admin: &UserResponse, name: &str) -> Category {
        self.state
            .category_service
            .create(admin, CategoryRequest { name: name.to_string() })
            .await
            .unwrap()
    }

    pub async fn blog(&self, owner: &UserResponse, title: &str, category: &Category) -> BlogDetails {
        self.state
            .blog_service
            .create(owner, form(title, &category.id), Some(image()))
            .await
            .unwrap()
    }
}

pub fn form(title: &str, category_id: &str) -> BlogForm {
    BlogForm {
        title: title.to_string(),
        description: format!("About {}", title),
        content: format!("<p>{} body</p>", title),
        category: category_id.to_string(),
    }
}

pub fn image() -> UploadedFile {
    UploadedFile {
        field_name: "image".to_string(),
        file_name: Some("cover.png".to_string()),
        data: PNG.to_vec(),
    }
}
