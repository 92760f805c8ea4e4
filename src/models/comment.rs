use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use validator::Validate;

use crate::models::user::UserSummary;
use crate::utils::serde_helpers::record_key;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    #[serde(with = "record_key")]
    pub id: String,
    pub blog_id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,
    /// 作者已被删除时为 None
    pub user: Option<UserSummary>,
    /// 仅管理员列表返回
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blog_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[serde(alias = "blogId")]
    pub blog_id: String,
    #[serde(alias = "content")]
    #[validate(length(min = 1, message = "Comment text is required"))]
    pub text: String,
}
