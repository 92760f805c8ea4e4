use crate::{
    error::{AppError, Result},
    models::{category::*, user::UserResponse},
    services::{
        policy::{ensure_can_mutate, Access},
        Database,
    },
    utils::validation,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct CategoryService {
    db: Arc<Database>,
}

impl CategoryService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    /// 按名称排序
    pub async fn list(&self) -> Result<Vec<Category>> {
        let mut categories: Vec<Category> = self.db.find_all("category").await?;
        categories.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(categories)
    }

    pub async fn get(&self, category_id: &str) -> Result<Category> {
        let category_id = validation::parse_id("category", category_id)?;
        self.find(&category_id)
            .await?
            .ok_or_else(|| AppError::not_found("Category"))
    }

    /// 不校验 ID 格式的查找，供博客填充分类时使用
    pub async fn find(&self, category_id: &str) -> Result<Option<Category>> {
        self.db.get_by_id("category", category_id).await
    }

    pub async fn create(&self, actor: &UserResponse, request: CategoryRequest) -> Result<Category> {
        ensure_can_mutate(actor, None, Access::AdminOnly, "create categories")?;

        let name = request.name.trim().to_string();
        validation::validate_category_name(&name)?;
        self.ensure_name_available(&name, None).await?;

        let category = Category {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            created_at: Utc::now(),
        };
        self.db.create("category", &category.id, &category).await?;

        info!("Category created: {} ({})", category.name, category.id);
        Ok(category)
    }

    pub async fn update(
        &self,
        actor: &UserResponse,
        category_id: &str,
        request: CategoryRequest,
    ) -> Result<Category> {
        ensure_can_mutate(actor, None, Access::AdminOnly, "update categories")?;

        let existing = self.get(category_id).await?;
        let name = request.name.trim().to_string();
        validation::validate_category_name(&name)?;

        if name == existing.name {
            return Ok(existing);
        }
        self.ensure_name_available(&name, Some(&existing.id)).await?;

        let updated: Option<Category> = self
            .db
            .merge_by_id("category", &existing.id, json!({ "name": name }))
            .await?;

        info!("Category {} renamed to {}", existing.id, name);
        updated.ok_or_else(|| AppError::not_found("Category"))
    }

    /// 删除分类，引用它的博客保留原 category_id
    pub async fn delete(&self, actor: &UserResponse, category_id: &str) -> Result<()> {
        ensure_can_mutate(actor, None, Access::AdminOnly, "delete categories")?;

        let existing = self.get(category_id).await?;
        self.db.delete_by_id("category", &existing.id).await?;

        info!("Category deleted: {} ({})", existing.name, existing.id);
        Ok(())
    }

    async fn ensure_name_available(&self, name: &str, except_id: Option<&str>) -> Result<()> {
        debug!("Checking category name availability: {}", name);
        let existing: Option<Category> = self.db.find_one("category", "name", name).await?;
        match existing {
            Some(c) if Some(c.id.as_str()) != except_id => {
                Err(AppError::conflict("Category already exists"))
            }
            _ => Ok(()),
        }
    }
}
