use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use validator::Validate;

use crate::models::{category::Category, comment::Comment, user::UserSummary};
use crate::utils::serde_helpers::record_key;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blog {
    #[serde(with = "record_key")]
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image: String,
    pub category_id: String,
    /// 作者
    pub user_id: String,
    /// 点赞用户集合，不含重复
    #[serde(default)]
    pub likes: Vec<String>,
    /// 评论 ID，按创建顺序
    #[serde(default)]
    pub comments: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Blog {
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }
}

/// 填充了作者、分类和评论的博客
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogDetails {
    #[serde(flatten)]
    pub blog: Blog,
    pub user: Option<UserSummary>,
    /// 分类被删除后为 None，category_id 仍保留原值
    pub category: Option<Category>,
    pub comment_list: Vec<Comment>,
    pub like_count: usize,
}

/// 创建/更新博客的表单字段（来自 multipart）
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct BlogForm {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 500, message = "Description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
}

impl BlogForm {
    /// 去掉首尾空白后再校验，全空白等同于缺失
    pub fn trimmed(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            content: self.content.trim().to_string(),
            category: self.category.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlogQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub exclude: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogContent {
    pub content: String,
}
