use crate::config::Config;
use crate::error::{AppError, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::{Response, Surreal};
use tracing::{debug, error, info};

/// 所有查询都把记录 ID 投影成纯键
const SELECT_FIELDS: &str = "*, meta::id(id) AS id";

/// 启动时定义的唯一索引
const SCHEMA: &str = r#"
    DEFINE INDEX user_email ON TABLE user COLUMNS email UNIQUE;
    DEFINE INDEX user_username ON TABLE user COLUMNS username UNIQUE;
    DEFINE INDEX category_name ON TABLE category COLUMNS name UNIQUE;
    DEFINE INDEX blog_user ON TABLE blog COLUMNS user_id;
    DEFINE INDEX comment_blog ON TABLE comment COLUMNS blog_id;
    DEFINE INDEX notification_recipient ON TABLE notification COLUMNS recipient_id;
"#;

/// 数据库服务
#[derive(Clone)]
pub struct Database {
    pub client: Surreal<Any>,
}

impl Database {
    /// 创建新的数据库实例
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Initializing database connection to {}", config.database_url);

        let client = any::connect(config.database_url.as_str()).await?;

        // 内嵌引擎不需要登录
        if !config.uses_embedded_database() {
            client
                .signin(Root {
                    username: &config.database_username,
                    password: &config.database_password,
                })
                .await?;
        }

        client
            .use_ns(config.database_namespace.as_str())
            .use_db(config.database_name.as_str())
            .await?;

        let db = Self { client };
        db.initialize_schema().await?;

        Ok(db)
    }

    /// 验证数据库连接
    pub async fn verify_connection(&self) -> Result<()> {
        match self.client.query("INFO FOR DB").await.and_then(|r| r.check()) {
            Ok(_) => {
                info!("Database connection verified successfully");
                Ok(())
            }
            Err(e) => {
                error!("Failed to verify database connection: {}", e);
                Err(AppError::from(e))
            }
        }
    }

    async fn initialize_schema(&self) -> Result<()> {
        self.client.query(SCHEMA).await?.check()?;
        debug!("Database schema initialized");
        Ok(())
    }

    /// 执行带参数的查询
    pub async fn query_with_params<P>(&self, sql: &str, params: P) -> Result<Response>
    where
        P: Serialize,
    {
        debug!("Executing query: {}", sql.trim());
        Ok(self.client.query(sql).bind(params).await?.check()?)
    }

    /// 在一个事务里执行多条语句，任意一条失败则全部回滚
    pub async fn transaction<P>(&self, statements: &str, params: P) -> Result<()>
    where
        P: Serialize,
    {
        let sql = format!("BEGIN TRANSACTION;\n{}\nCOMMIT TRANSACTION;", statements);
        self.query_with_params(&sql, params).await?;
        Ok(())
    }

    /// 围绕某条记录的事务
    ///
    /// 语句应在记录不存在时 THROW；事务失败后若记录确实已被删除，返回 NotFound。
    pub async fn transaction_on<P>(
        &self,
        table: &str,
        id: &str,
        resource: &str,
        statements: &str,
        params: P,
    ) -> Result<()>
    where
        P: Serialize,
    {
        match self.transaction(statements, params).await {
            Ok(()) => Ok(()),
            Err(e) if !self.exists(table, id).await? => {
                debug!("Transaction on missing {}:{} rolled back: {}", table, id, e);
                Err(AppError::not_found(resource))
            }
            Err(e) => Err(e),
        }
    }

    /// 记录是否存在
    pub async fn exists(&self, table: &str, id: &str) -> Result<bool> {
        let mut response = self
            .query_with_params(
                "SELECT VALUE meta::id(id) FROM type::thing($tb, $id)",
                json!({ "tb": table, "id": id }),
            )
            .await?;
        let keys: Vec<String> = response.take(0)?;
        Ok(!keys.is_empty())
    }

    /// 以指定 ID 创建记录
    pub async fn create<T>(&self, table: &str, id: &str, data: &T) -> Result<()>
    where
        T: Serialize,
    {
        self.query_with_params(
            "CREATE type::thing($tb, $id) CONTENT $data",
            json!({
                "tb": table,
                "id": id,
                "data": record_content(data)?,
            }),
        )
        .await?;
        Ok(())
    }

    /// 通过ID获取单个记录
    pub async fn get_by_id<T>(&self, table: &str, id: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let sql = format!("SELECT {} FROM type::thing($tb, $id)", SELECT_FIELDS);
        let mut response = self
            .query_with_params(&sql, json!({ "tb": table, "id": id }))
            .await?;
        let results: Vec<T> = response.take(0)?;
        Ok(results.into_iter().next())
    }

    /// 按条件查询，`condition` 中的参数由 `params` 绑定
    pub async fn find_where<T>(&self, table: &str, condition: &str, params: Value) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let sql = format!("SELECT {} FROM type::table($tb) WHERE {}", SELECT_FIELDS, condition);
        let mut response = self.query_with_params(&sql, with_table(params, table)).await?;
        Ok(response.take(0)?)
    }

    /// 查询整张表
    pub async fn find_all<T>(&self, table: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let sql = format!("SELECT {} FROM type::table($tb)", SELECT_FIELDS);
        let mut response = self.query_with_params(&sql, json!({ "tb": table })).await?;
        Ok(response.take(0)?)
    }

    /// 查找单个记录
    pub async fn find_one<T>(&self, table: &str, field: &str, value: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let condition = format!("{} = $value", field);
        let results: Vec<T> = self
            .find_where(table, &condition, json!({ "value": value }))
            .await?;
        Ok(results.into_iter().next())
    }

    /// 按 ID 批量获取，顺序与 `ids` 一致，缺失的记录被跳过
    pub async fn get_many<T>(&self, table: &str, ids: &[String]) -> Result<Vec<T>>
    where
        T: DeserializeOwned + HasKey,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found: Vec<T> = self
            .find_where(table, "meta::id(id) INSIDE $ids", json!({ "ids": ids }))
            .await?;

        let mut ordered = Vec::with_capacity(found.len());
        let mut remaining = found;
        for id in ids {
            if let Some(pos) = remaining.iter().position(|r| r.key() == id) {
                ordered.push(remaining.swap_remove(pos));
            }
        }
        Ok(ordered)
    }

    /// 合并更新已存在的记录，记录不存在时返回 None
    ///
    /// 按表扫描加 WHERE 更新：`UPDATE type::thing(..)` 会凭空创建缺失的记录。
    pub async fn merge_by_id<T>(&self, table: &str, id: &str, updates: Value) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.query_with_params(
            "UPDATE type::table($tb) MERGE $updates WHERE id = type::thing($tb, $id)",
            json!({ "tb": table, "id": id, "updates": updates }),
        )
        .await?;
        self.get_by_id(table, id).await
    }

    /// 通过ID删除记录
    pub async fn delete_by_id(&self, table: &str, id: &str) -> Result<()> {
        self.query_with_params(
            "DELETE type::thing($tb, $id)",
            json!({ "tb": table, "id": id }),
        )
        .await?;
        Ok(())
    }

    /// 统计满足条件的记录数
    pub async fn count_where(&self, table: &str, condition: &str, params: Value) -> Result<i64> {
        #[derive(serde::Deserialize)]
        struct CountRow {
            total: i64,
        }

        let sql = format!(
            "SELECT count() AS total FROM type::table($tb) WHERE {} GROUP ALL",
            condition
        );
        let mut response = self.query_with_params(&sql, with_table(params, table)).await?;
        let rows: Vec<CountRow> = response.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}

/// 能报告自身记录键的类型，用于 `get_many` 保序
pub trait HasKey {
    fn key(&self) -> &str;
}

impl HasKey for crate::models::user::User {
    fn key(&self) -> &str {
        &self.id
    }
}

impl HasKey for crate::models::comment::Comment {
    fn key(&self) -> &str {
        &self.id
    }
}

impl HasKey for crate::models::category::Category {
    fn key(&self) -> &str {
        &self.id
    }
}

impl HasKey for crate::models::blog::Blog {
    fn key(&self) -> &str {
        &self.id
    }
}

/// 记录内容去掉 `id` 字段，ID 由 `type::thing` 指定
pub fn record_content<T: Serialize>(data: &T) -> Result<Value> {
    let mut value = serde_json::to_value(data)?;
    if let Value::Object(map) = &mut value {
        map.remove("id");
    }
    Ok(value)
}

fn with_table(params: Value, table: &str) -> Value {
    let mut params = match params {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    params.insert("tb".to_string(), Value::String(table.to_string()));
    Value::Object(params)
}
