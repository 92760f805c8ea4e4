use serde::Serialize;
use serde_json::Value;

/// 成功响应：`{ "success": true, "data": ..., "message"? }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }
}

impl ApiResponse<()> {
    /// 只有提示信息的响应（删除、批量已读等）
    pub fn message(message: impl Into<String>) -> Self {
        Self::success_with_message((), message)
    }
}

/// 失败响应：`{ "success": false, "error": { code, message, details? } }`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                code,
                message: message.into(),
                details: None,
            },
        }
    }

    /// 附带字段级校验信息
    pub fn details(mut self, details: Value) -> Self {
        self.error.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_only_response_has_null_data() {
        let body = serde_json::to_value(ApiResponse::message("Blog deleted successfully")).unwrap();
        assert_eq!(
            body,
            json!({ "success": true, "data": null, "message": "Blog deleted successfully" })
        );
    }

    #[test]
    fn test_error_envelope_omits_empty_details() {
        let body = serde_json::to_value(ErrorResponse::new("NOT_FOUND", "Blog not found")).unwrap();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"]["code"], json!("NOT_FOUND"));
        assert!(body["error"].get("details").is_none());

        let body = serde_json::to_value(
            ErrorResponse::new("VALIDATION_ERROR", "Validation failed").details(json!({ "title": ["required"] })),
        )
        .unwrap();
        assert_eq!(body["error"]["details"]["title"][0], json!("required"));
    }
}
