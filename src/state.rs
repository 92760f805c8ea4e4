use crate::{
    config::Config,
    error::Result,
    services::{
        database::Database,
        auth::AuthService,
        blog::BlogService,
        user::UserService,
        comment::CommentService,
        category::CategoryService,
        notification::NotificationService,
        media::{MediaService, UploadConfig},
    },
};
use std::sync::Arc;
use tracing::info;

/// 应用程序的共享状态
/// 包含所有服务和配置的引用
#[derive(Clone)]
pub struct AppState {
    /// 应用配置
    pub config: Config,

    /// 数据库连接
    pub db: Arc<Database>,

    /// 认证服务
    pub auth_service: AuthService,

    /// 博客服务
    pub blog_service: BlogService,

    /// 用户服务
    pub user_service: UserService,

    /// 评论服务
    pub comment_service: CommentService,

    /// 分类服务
    pub category_service: CategoryService,

    /// 通知服务
    pub notification_service: NotificationService,

    /// 上传文件服务
    pub media_service: MediaService,
}

impl AppState {
    /// 连接数据库并初始化所有服务
    pub async fn build(config: Config) -> Result<Self> {
        let db = Arc::new(Database::new(&config).await?);
        db.verify_connection().await?;

        let media_service = MediaService::new(UploadConfig::from_config(&config)).await?;
        let user_service = UserService::new(db.clone(), media_service.clone()).await?;
        let auth_service = AuthService::new(&config, user_service.clone()).await?;
        let category_service = CategoryService::new(db.clone()).await?;
        let notification_service = NotificationService::new(db.clone(), user_service.clone()).await?;
        let comment_service = CommentService::new(db.clone(), &config, user_service.clone()).await?;
        let blog_service = BlogService::new(
            db.clone(),
            &config,
            media_service.clone(),
            user_service.clone(),
            category_service.clone(),
        )
        .await?;

        info!("All services initialized");

        Ok(Self {
            config,
            db,
            auth_service,
            blog_service,
            user_service,
            comment_service,
            category_service,
            notification_service,
            media_service,
        })
    }
}
