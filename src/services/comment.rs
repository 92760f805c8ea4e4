use crate::{
    config::Config,
    error::{AppError, Result},
    models::{
        blog::Blog,
        comment::*,
        notification::{Notification, NotificationType},
        user::UserResponse,
    },
    services::{
        blog::REQUIRE_BLOG,
        database::record_content,
        policy::{ensure_can_mutate, Access},
        Database, UserService,
    },
    utils::validation,
};
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

const CREATE_COMMENT: &str = r#"
    CREATE type::thing('comment', $comment_id) CONTENT $comment;
    UPDATE blog SET comments += $comment_id WHERE id = type::thing('blog', $blog);
"#;
const NOTIFY: &str = "CREATE type::thing('notification', $notification_id) CONTENT $notification;";

// 博客可能已不存在，按表更新避免重新创建它
const DELETE_COMMENT: &str = r#"
    UPDATE blog SET comments -= $comment_id WHERE id = type::thing('blog', $blog);
    DELETE type::thing('comment', $comment_id);
"#;

/// 评论服务
#[derive(Clone)]
pub struct CommentService {
    db: Arc<Database>,
    max_length: usize,
    user_service: UserService,
}

impl CommentService {
    pub async fn new(db: Arc<Database>, config: &Config, user_service: UserService) -> Result<Self> {
        Ok(Self {
            db,
            max_length: config.max_comment_length,
            user_service,
        })
    }

    /// 发表评论：评论记录、博客评论列表和给作者的通知在同一个事务里写入
    pub async fn create(&self, actor: &UserResponse, request: CreateCommentRequest) -> Result<CommentWithAuthor> {
        debug!("Creating comment by {} on blog {}", actor.id, request.blog_id);

        let blog_id = validation::parse_id("blog", &request.blog_id)?;
        let blog: Blog = self
            .db
            .get_by_id("blog", &blog_id)
            .await?
            .ok_or_else(|| AppError::not_found("Blog"))?;

        let text = request.text.trim().to_string();
        validation::validate_comment_text(&text, self.max_length)?;
        request.validate()?;

        let comment = Comment {
            id: uuid::Uuid::new_v4().to_string(),
            blog_id: blog.id.clone(),
            user_id: actor.id.clone(),
            content: text,
            created_at: Utc::now(),
        };

        let mut statements = format!("{}{}", REQUIRE_BLOG, CREATE_COMMENT);
        let mut params = json!({
            "blog": blog.id,
            "comment_id": comment.id,
            "comment": record_content(&comment)?,
        });

        if let Some(notification) = Notification::for_action(
            NotificationType::Comment,
            &blog.user_id,
            &actor.id,
            &blog.id,
            &blog.title,
        ) {
            statements.push_str(NOTIFY);
            params["notification_id"] = json!(notification.id);
            params["notification"] = record_content(&notification)?;
        }

        self.db
            .transaction_on("blog", &blog.id, "Blog", &statements, params)
            .await?;
        info!("Comment {} added to blog {} by {}", comment.id, blog.id, actor.id);

        let user = self.user_service.summaries(&[actor.id.clone()]).await?;
        Ok(CommentWithAuthor {
            user: user.get(&actor.id).cloned(),
            comment,
            blog_title: None,
        })
    }

    /// 某篇博客的评论，按时间正序
    pub async fn list_for_blog(&self, blog_id: &str) -> Result<Vec<CommentWithAuthor>> {
        let blog_id = validation::parse_id("blog", blog_id)?;
        let mut comments: Vec<Comment> = self
            .db
            .find_where("comment", "blog_id = $blog", json!({ "blog": blog_id }))
            .await?;
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        self.with_authors(comments, None).await
    }

    /// 管理员查看全部评论，最新的在前，附带博客标题
    pub async fn list_all(&self, actor: &UserResponse) -> Result<Vec<CommentWithAuthor>> {
        ensure_can_mutate(actor, None, Access::AdminOnly, "view all comments")?;

        let mut comments: Vec<Comment> = self.db.find_all("comment").await?;
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut blog_ids: Vec<String> = comments.iter().map(|c| c.blog_id.clone()).collect();
        blog_ids.sort();
        blog_ids.dedup();
        let titles: HashMap<String, String> = self
            .db
            .get_many::<Blog>("blog", &blog_ids)
            .await?
            .into_iter()
            .map(|b| (b.id, b.title))
            .collect();

        self.with_authors(comments, Some(&titles)).await
    }

    /// 删除评论并从博客的评论列表中移除，作者本人或管理员可操作
    pub async fn delete(&self, actor: &UserResponse, comment_id: &str) -> Result<()> {
        let comment_id = validation::parse_id("comment", comment_id)?;
        let comment: Comment = self
            .db
            .get_by_id("comment", &comment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment"))?;

        ensure_can_mutate(actor, Some(&comment.user_id), Access::OwnerOrAdmin, "delete this comment")?;

        self.db
            .transaction(
                DELETE_COMMENT,
                json!({ "blog": comment.blog_id, "comment_id": comment.id }),
            )
            .await?;

        info!("Comment {} deleted by {}", comment.id, actor.id);
        Ok(())
    }

    async fn with_authors(
        &self,
        comments: Vec<Comment>,
        titles: Option<&HashMap<String, String>>,
    ) -> Result<Vec<CommentWithAuthor>> {
        let user_ids: Vec<String> = comments.iter().map(|c| c.user_id.clone()).collect();
        let users = self.user_service.summaries(&user_ids).await?;

        Ok(comments
            .into_iter()
            .map(|comment| CommentWithAuthor {
                user: users.get(&comment.user_id).cloned(),
                blog_title: titles.and_then(|t| t.get(&comment.blog_id).cloned()),
                comment,
            })
            .collect())
    }
}
