/// SurrealDB 记录 ID 的反序列化辅助模块
///
/// 查询统一使用 `meta::id(id) AS id` 投影出纯键，但直接读取记录时
/// 仍可能拿到 `table:key` 字符串或 `{ tb, id }` 结构，这里统一成纯键。

use serde::{Deserialize, Deserializer, Serializer};

pub mod record_key {
    use super::*;

    pub fn serialize<S>(id: &str, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(id)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum IdValue {
            String(String),
            Thing {
                #[allow(dead_code)]
                tb: String,
                id: serde_json::Value,
            },
        }

        match IdValue::deserialize(deserializer)? {
            IdValue::String(s) => Ok(strip_table_prefix(&s)),
            IdValue::Thing { id, .. } => Ok(key_from_json(&id)),
        }
    }

    fn key_from_json(id: &serde_json::Value) -> String {
        match id {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            // 1.x 的 Id 枚举形如 {"String": "..."}
            serde_json::Value::Object(map) => map
                .values()
                .next()
                .map(key_from_json)
                .unwrap_or_default(),
            other => other.to_string(),
        }
    }
}

/// `blog:⟨uuid⟩` / `blog:uuid` -> `uuid`
pub fn strip_table_prefix(raw: &str) -> String {
    let key = match raw.split_once(':') {
        Some((table, rest)) if !table.is_empty() && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') => rest,
        _ => raw,
    };
    key.trim_start_matches('⟨')
        .trim_end_matches('⟩')
        .trim_matches('`')
        .to_string()
}
