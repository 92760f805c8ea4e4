pub mod database;
pub mod auth;
pub mod policy;
pub mod user;
pub mod blog;
pub mod comment;
pub mod category;
pub mod notification;
pub mod media;

// 重新导出常用类型
pub use database::Database;
pub use auth::AuthService;
pub use user::UserService;
pub use blog::BlogService;
pub use comment::CommentService;
pub use category::CategoryService;
pub use notification::NotificationService;
pub use media::MediaService;
