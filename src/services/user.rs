use crate::{
    error::{AppError, Result},
    models::{blog::Blog, user::*},
    services::{
        media::{MediaService, UploadedFile},
        policy::{ensure_can_mutate, Access},
        Database,
    },
    utils::validation,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

/// 删除用户时在一个事务里完成的级联清理
const DELETE_USER_CASCADE: &str = r#"
    LET $own_comments = (SELECT VALUE meta::id(id) FROM comment WHERE user_id = $user);
    UPDATE blog SET comments = array::complement(comments, $own_comments)
        WHERE user_id != $user AND comments CONTAINSANY $own_comments;
    DELETE comment WHERE user_id = $user;
    DELETE blog WHERE user_id = $user;
    DELETE notification WHERE recipient_id = $user;
    DELETE type::thing('user', $user);
"#;

/// 用户服务，处理用户相关的业务逻辑
#[derive(Clone)]
pub struct UserService {
    db: Arc<Database>,
    media: MediaService,
}

impl UserService {
    /// 创建新的用户服务实例
    pub async fn new(db: Arc<Database>, media: MediaService) -> Result<Self> {
        Ok(Self { db, media })
    }

    /// 写入新用户；邮箱和用户名先查重，唯一索引兜底
    pub async fn create_user(&self, user: User) -> Result<User> {
        if self.find_by_email(&user.email).await?.is_some() {
            return Err(AppError::conflict("Email already registered"));
        }
        if self.find_by_username(&user.username).await?.is_some() {
            return Err(AppError::conflict("Username already taken"));
        }

        self.db.create("user", &user.id, &user).await?;
        debug!("Created user record {}", user.id);
        Ok(user)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        self.db.get_by_id("user", user_id).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.db.find_one("user", "email", email).await
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.db.find_one("user", "username", username).await
    }

    /// 获取用户公开资料，路径参数需为合法 UUID
    pub async fn get_profile(&self, user_id: &str) -> Result<UserResponse> {
        let user_id = validation::parse_id("user", user_id)?;
        self.get_user(&user_id)
            .await?
            .map(|u| u.to_response())
            .ok_or_else(|| AppError::not_found("User"))
    }

    /// 所有用户（不含密码），最新注册的在前
    pub async fn list_users(&self) -> Result<Vec<UserResponse>> {
        let mut users: Vec<User> = self.db.find_all("user").await?;
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users.iter().map(User::to_response).collect())
    }

    /// 批量加载作者信息，已删除的用户不会出现在结果里
    pub async fn summaries(&self, user_ids: &[String]) -> Result<HashMap<String, UserSummary>> {
        let mut ids = user_ids.to_vec();
        ids.sort();
        ids.dedup();

        let users: Vec<User> = self.db.get_many("user", &ids).await?;
        Ok(users
            .into_iter()
            .map(|u| (u.id.clone(), u.to_summary()))
            .collect())
    }

    /// 更新资料：姓名、邮箱、头像（上传新文件或移除）
    pub async fn update_user(
        &self,
        actor: &UserResponse,
        user_id: &str,
        request: UpdateUserRequest,
        profile_image: Option<UploadedFile>,
    ) -> Result<UserResponse> {
        let user_id = validation::parse_id("user", user_id)?;
        debug!("Updating user {} by {}", user_id, actor.id);

        let user = self
            .get_user(&user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;
        ensure_can_mutate(actor, Some(&user.id), Access::OwnerOrAdmin, "update this user")?;

        let request = UpdateUserRequest {
            name: request.name.map(|n| n.trim().to_string()),
            email: request.email.map(|e| validation::normalize_email(&e)),
            ..request
        };
        request.validate()?;

        let mut updates = Map::new();

        if let Some(name) = &request.name {
            validation::validate_display_name(name)?;
            updates.insert("name".to_string(), json!(name));
        }

        if let Some(email) = &request.email {
            validation::validate_email_format(email)?;
            if email != &user.email {
                if let Some(existing) = self.find_by_email(email).await? {
                    if existing.id != user.id {
                        return Err(AppError::conflict("Email already registered"));
                    }
                }
                updates.insert("email".to_string(), json!(email));
            }
        }

        let mut stale_image = None;
        let mut new_image = None;
        if let Some(file) = &profile_image {
            let reference = self.media.save_image(file).await?;
            updates.insert("profile_image".to_string(), json!(reference));
            new_image = Some(reference);
            stale_image = Some(user.profile_image.clone());
        } else if request.remove_profile_image {
            updates.insert("profile_image".to_string(), json!(""));
            stale_image = Some(user.profile_image.clone());
        }

        if updates.is_empty() {
            return Ok(user.to_response());
        }

        let updated: Option<User> = match self
            .db
            .merge_by_id("user", &user.id, Value::Object(updates))
            .await
        {
            Ok(updated) => updated,
            Err(e) => {
                if let Some(reference) = &new_image {
                    self.media.remove(reference).await;
                }
                return Err(e);
            }
        };

        if let Some(old) = stale_image.filter(|s| !s.is_empty()) {
            self.media.remove(&old).await;
        }

        let updated = updated.ok_or_else(|| AppError::not_found("User"))?;
        info!("User {} updated", updated.id);
        Ok(updated.to_response())
    }

    /// 删除用户及其博客、评论和收到的通知
    pub async fn delete_user(&self, actor: &UserResponse, user_id: &str) -> Result<()> {
        let user_id = validation::parse_id("user", user_id)?;

        let user = self
            .get_user(&user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;
        ensure_can_mutate(actor, Some(&user.id), Access::OwnerOrAdmin, "delete this user")?;

        // 提交后再删文件，先记下图片引用
        let blogs: Vec<Blog> = self
            .db
            .find_where("blog", "user_id = $user", json!({ "user": user.id }))
            .await?;

        self.db
            .transaction(DELETE_USER_CASCADE, json!({ "user": user.id }))
            .await?;

        info!(
            "User {} deleted by {} along with {} blogs",
            user.id,
            actor.id,
            blogs.len()
        );

        for blog in &blogs {
            if !blog.image.is_empty() {
                self.media.remove(&blog.image).await;
            }
        }
        if !user.profile_image.is_empty() {
            self.media.remove(&user.profile_image).await;
        }

        Ok(())
    }
}
