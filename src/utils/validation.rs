use crate::error::{AppError, Result};
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

/// 验证邮箱并返回详细错误信息
pub fn validate_email_format(email: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }

    if !validator::validate_email(email) {
        return Err(AppError::Validation("Please enter a valid email".to_string()));
    }

    if email.len() > 254 {
        return Err(AppError::Validation("Email is too long".to_string()));
    }

    Ok(())
}

/// 规范化邮箱：去空白、转小写
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// 验证用户名格式
pub fn validate_username(username: &str) -> Result<()> {
    static USERNAME: OnceLock<Regex> = OnceLock::new();

    if username.trim().is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }

    if username.chars().count() < 3 {
        return Err(AppError::Validation(
            "Username must be at least 3 characters long".to_string(),
        ));
    }

    if username.chars().count() > 30 {
        return Err(AppError::Validation(
            "Username must be at most 30 characters long".to_string(),
        ));
    }

    let pattern = USERNAME.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_.-]+$").unwrap());
    if !pattern.is_match(username) {
        return Err(AppError::Validation(
            "Username may only contain letters, digits, '.', '_' and '-'".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }

    if password.chars().count() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters long".to_string(),
        ));
    }

    Ok(())
}

/// 验证显示名称格式（允许为空）
pub fn validate_display_name(display_name: &str) -> Result<()> {
    if display_name.chars().count() > 50 {
        return Err(AppError::Validation(
            "Name must be at most 50 characters".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_comment_text(text: &str, max_length: usize) -> Result<()> {
    if text.trim().is_empty() {
        return Err(AppError::BadRequest("Comment text is required".to_string()));
    }

    if text.chars().count() > max_length {
        return Err(AppError::BadRequest(format!(
            "Comment must be at most {} characters",
            max_length
        )));
    }

    Ok(())
}

pub fn validate_category_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("Category name is required".to_string()));
    }

    if name.trim().chars().count() > 50 {
        return Err(AppError::BadRequest(
            "Category name must be at most 50 characters".to_string(),
        ));
    }

    Ok(())
}

/// 校验并规范化路径/请求体中的 ID，`kind` 用于错误信息，如 "blog"
pub fn parse_id(kind: &str, raw: &str) -> Result<String> {
    Uuid::parse_str(raw.trim())
        .map(|id| id.to_string())
        .map_err(|_| AppError::BadRequest(format!("Invalid {} ID format", kind)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_format() {
        assert!(validate_email_format("user@example.com").is_ok());
        assert!(validate_email_format("test.email+tag@domain.co.uk").is_ok());

        assert!(validate_email_format("").is_err());
        assert!(validate_email_format("invalid-email").is_err());
        assert!(validate_email_format("@domain.com").is_err());
        assert!(validate_email_format(&"a".repeat(255)).is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("user123").is_ok());
        assert!(validate_username("test_user").is_ok());
        assert!(validate_username("user-name").is_ok());

        assert!(validate_username("").is_err());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("user@name").is_err());
        assert!(validate_username(&"a".repeat(31)).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password("12345").is_err());
    }

    #[test]
    fn test_validate_display_name() {
        assert!(validate_display_name("").is_ok());
        assert!(validate_display_name("John Doe").is_ok());
        assert!(validate_display_name(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_comment_text() {
        assert!(validate_comment_text("Nice post", 100).is_ok());
        assert!(matches!(
            validate_comment_text("   ", 100),
            Err(AppError::BadRequest(_))
        ));
        assert!(validate_comment_text(&"a".repeat(101), 100).is_err());
    }

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4().to_string();
        assert_eq!(parse_id("blog", &id).unwrap(), id);

        match parse_id("blog", "not-an-id") {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Invalid blog ID format"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
