use crate::{
    config::Config,
    error::{AppError, Result},
    models::{
        blog::*,
        category::Category,
        comment::Comment,
        notification::{Notification, NotificationType},
        user::UserResponse,
    },
    services::{
        database::record_content,
        media::{MediaService, UploadedFile},
        policy::{ensure_can_mutate, Access},
        CategoryService, Database, UserService,
    },
    utils::validation,
};
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use validator::Validate;

/// 博客已被并发删除时中止事务
pub(crate) const REQUIRE_BLOG: &str = r#"
    IF array::len((SELECT VALUE id FROM type::thing('blog', $blog))) = 0 { THROW "blog not found"; };
"#;

// 按表更新，记录不存在时不会被创建
const LIKE: &str = "UPDATE blog SET likes = array::union(likes, [$user]) WHERE id = type::thing('blog', $blog);";
const UNLIKE: &str = "UPDATE blog SET likes -= $user WHERE id = type::thing('blog', $blog);";
const NOTIFY: &str = "CREATE type::thing('notification', $notification_id) CONTENT $notification;";

const DELETE_BLOG_CASCADE: &str = r#"
    DELETE comment WHERE blog_id = $blog;
    DELETE notification WHERE blog_id = $blog;
    DELETE type::thing('blog', $blog);
"#;

#[derive(Clone)]
pub struct BlogService {
    db: Arc<Database>,
    config: Config,
    media: MediaService,
    user_service: UserService,
    category_service: CategoryService,
}

impl BlogService {
    pub async fn new(
        db: Arc<Database>,
        config: &Config,
        media: MediaService,
        user_service: UserService,
        category_service: CategoryService,
    ) -> Result<Self> {
        Ok(Self {
            db,
            config: config.clone(),
            media,
            user_service,
            category_service,
        })
    }

    /// 创建博客，所有字段和封面图都是必填的
    pub async fn create(
        &self,
        actor: &UserResponse,
        form: BlogForm,
        image: Option<UploadedFile>,
    ) -> Result<BlogDetails> {
        debug!("Creating blog for user: {}", actor.id);

        let image = image.ok_or_else(|| AppError::bad_request("An image is required for the blog post"))?;
        let form = form.trimmed();
        form.validate()?;
        let category_id = self.existing_category(&form.category).await?;

        let image = self.media.save_image(&image).await?;
        let now = Utc::now();
        let blog = Blog {
            id: uuid::Uuid::new_v4().to_string(),
            title: form.title,
            description: form.description,
            content: form.content,
            image,
            category_id,
            user_id: actor.id.clone(),
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.db.create("blog", &blog.id, &blog).await {
            self.media.remove(&blog.image).await;
            return Err(e);
        }

        info!("Blog created: {} ({}) by {}", blog.title, blog.id, actor.id);
        self.populate_one(blog).await
    }

    /// 博客列表：按分类、关键词过滤，可排除一篇，最新的在前
    pub async fn list(&self, query: BlogQuery) -> Result<Vec<BlogDetails>> {
        let mut conditions = vec!["true".to_string()];
        let mut params = Map::new();

        if let Some(category) = query.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            conditions.push("category_id = $category".to_string());
            params.insert("category".to_string(), json!(category));
        }

        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            conditions.push(
                "(string::contains(string::lowercase(title), $search) \
                 OR string::contains(string::lowercase(description), $search) \
                 OR string::contains(string::lowercase(content), $search))"
                    .to_string(),
            );
            params.insert("search".to_string(), json!(search.to_lowercase()));
        }

        if let Some(exclude) = query.exclude.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            conditions.push("meta::id(id) != $exclude".to_string());
            params.insert("exclude".to_string(), json!(exclude));
        }

        let blogs: Vec<Blog> = self
            .db
            .find_where("blog", &conditions.join(" AND "), Value::Object(params))
            .await?;
        self.populate(newest_first(blogs)).await
    }

    pub async fn get(&self, blog_id: &str) -> Result<BlogDetails> {
        let blog = self.load(blog_id).await?;
        self.populate_one(blog).await
    }

    pub async fn get_content(&self, blog_id: &str) -> Result<BlogContent> {
        let blog = self.load(blog_id).await?;
        Ok(BlogContent {
            content: blog.content,
        })
    }

    /// 标题搜索，结果数受 `search_max_results` 限制
    pub async fn search(&self, query: SearchQuery) -> Result<Vec<BlogDetails>> {
        let q = query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AppError::bad_request("Search query is required"))?;

        let blogs: Vec<Blog> = self
            .db
            .find_where(
                "blog",
                "string::contains(string::lowercase(title), $q)",
                json!({ "q": q.to_lowercase() }),
            )
            .await?;

        let mut blogs = newest_first(blogs);
        blogs.truncate(self.config.search_max_results);
        self.populate(blogs).await
    }

    /// 某用户的全部博客，仅本人或管理员可查看
    pub async fn list_by_user(&self, actor: &UserResponse, user_id: &str) -> Result<Vec<BlogDetails>> {
        let user_id = validation::parse_id("user", user_id)?;
        ensure_can_mutate(actor, Some(&user_id), Access::OwnerOrAdmin, "view these blogs")?;
        self.blogs_of(&user_id).await
    }

    /// 公开的作者主页列表
    pub async fn public_by_user(&self, user_id: &str) -> Result<Vec<BlogDetails>> {
        let profile = self.user_service.get_profile(user_id).await?;
        self.blogs_of(&profile.id).await
    }

    /// 更新博客；先检查权限再写入，新封面会替换并删除旧文件
    pub async fn update(
        &self,
        actor: &UserResponse,
        blog_id: &str,
        form: BlogForm,
        image: Option<UploadedFile>,
    ) -> Result<BlogDetails> {
        let blog = self.load(blog_id).await?;
        ensure_can_mutate(actor, Some(&blog.user_id), Access::OwnerOrAdmin, "update this blog")?;

        let form = form.trimmed();
        form.validate()?;
        let category_id = self.existing_category(&form.category).await?;

        let new_image = match &image {
            Some(file) => Some(self.media.save_image(file).await?),
            None => None,
        };

        let mut updates = json!({
            "title": form.title,
            "description": form.description,
            "content": form.content,
            "category_id": category_id,
            "updated_at": Utc::now(),
        });
        if let Some(reference) = &new_image {
            updates["image"] = json!(reference);
        }

        let updated: Option<Blog> = match self.db.merge_by_id("blog", &blog.id, updates).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Some(reference) = &new_image {
                    self.media.remove(reference).await;
                }
                return Err(e);
            }
        };

        if new_image.is_some() && !blog.image.is_empty() {
            self.media.remove(&blog.image).await;
        }

        let updated = updated.ok_or_else(|| AppError::not_found("Blog"))?;
        info!("Blog updated: {} by {}", updated.id, actor.id);
        self.populate_one(updated).await
    }

    /// 删除博客及其评论、相关通知，提交后删除封面文件
    pub async fn delete(&self, actor: &UserResponse, blog_id: &str) -> Result<()> {
        let blog = self.load(blog_id).await?;
        ensure_can_mutate(actor, Some(&blog.user_id), Access::OwnerOrAdmin, "delete this blog")?;

        self.db
            .transaction(DELETE_BLOG_CASCADE, json!({ "blog": blog.id }))
            .await?;

        if !blog.image.is_empty() {
            self.media.remove(&blog.image).await;
        }

        info!("Blog deleted: {} by {}", blog.id, actor.id);
        Ok(())
    }

    /// 点赞/取消点赞；新点赞且不是作者本人时在同一事务里通知作者
    pub async fn toggle_like(&self, actor: &UserResponse, blog_id: &str) -> Result<BlogDetails> {
        let blog = self.load(blog_id).await?;
        let mut params = json!({ "blog": blog.id, "user": actor.id });
        let mut statements = REQUIRE_BLOG.to_string();

        if blog.is_liked_by(&actor.id) {
            statements.push_str(UNLIKE);
            self.db
                .transaction_on("blog", &blog.id, "Blog", &statements, params)
                .await?;
            debug!("User {} unliked blog {}", actor.id, blog.id);
        } else {
            statements.push_str(LIKE);
            let notification = Notification::for_action(
                NotificationType::Like,
                &blog.user_id,
                &actor.id,
                &blog.id,
                &blog.title,
            );
            if let Some(notification) = &notification {
                statements.push_str(NOTIFY);
                params["notification_id"] = json!(notification.id);
                params["notification"] = record_content(notification)?;
            }

            self.db
                .transaction_on("blog", &blog.id, "Blog", &statements, params)
                .await?;
            match notification {
                Some(_) => info!("User {} liked blog {}, notified {}", actor.id, blog.id, blog.user_id),
                None => debug!("User {} liked own blog {}", actor.id, blog.id),
            }
        }

        self.get(&blog.id).await
    }

    /// 按 ID 加载，ID 格式错误为 BadRequest，不存在为 NotFound
    pub async fn load(&self, blog_id: &str) -> Result<Blog> {
        let blog_id = validation::parse_id("blog", blog_id)?;
        self.db
            .get_by_id("blog", &blog_id)
            .await?
            .ok_or_else(|| AppError::not_found("Blog"))
    }

    async fn blogs_of(&self, user_id: &str) -> Result<Vec<BlogDetails>> {
        let blogs: Vec<Blog> = self
            .db
            .find_where("blog", "user_id = $user", json!({ "user": user_id }))
            .await?;
        self.populate(newest_first(blogs)).await
    }

    async fn existing_category(&self, raw: &str) -> Result<String> {
        let category_id = validation::parse_id("category", raw)?;
        match self.category_service.find(&category_id).await? {
            Some(category) => Ok(category.id),
            None => {
                warn!("Blog references missing category {}", category_id);
                Err(AppError::bad_request("Category does not exist"))
            }
        }
    }

    async fn populate_one(&self, blog: Blog) -> Result<BlogDetails> {
        self.populate(vec![blog])
            .await?
            .pop()
            .ok_or_else(|| AppError::internal("Failed to load blog details"))
    }

    /// 填充作者、分类和评论；已删除的关联对象为空
    async fn populate(&self, blogs: Vec<Blog>) -> Result<Vec<BlogDetails>> {
        if blogs.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids: Vec<String> = blogs.iter().map(|b| b.user_id.clone()).collect();
        let users = self.user_service.summaries(&user_ids).await?;

        let mut category_ids: Vec<String> = blogs.iter().map(|b| b.category_id.clone()).collect();
        category_ids.sort();
        category_ids.dedup();
        let categories: HashMap<String, Category> = self
            .db
            .get_many::<Category>("category", &category_ids)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        let comment_ids: Vec<String> = blogs.iter().flat_map(|b| b.comments.clone()).collect();
        let comments: HashMap<String, Comment> = self
            .db
            .get_many::<Comment>("comment", &comment_ids)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        Ok(blogs
            .into_iter()
            .map(|blog| {
                let comment_list = blog
                    .comments
                    .iter()
                    .filter_map(|id| comments.get(id).cloned())
                    .collect();
                BlogDetails {
                    user: users.get(&blog.user_id).cloned(),
                    category: categories.get(&blog.category_id).cloned(),
                    comment_list,
                    like_count: blog.likes.len(),
                    blog,
                }
            })
            .collect())
    }
}

fn newest_first(mut blogs: Vec<Blog>) -> Vec<Blog> {
    blogs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    blogs
}
