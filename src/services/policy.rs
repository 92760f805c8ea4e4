//! 统一的写操作授权判断。
//!
//! 所有处理器都通过 [`ensure_can_mutate`] 检查权限，而不是各自比较角色。

use crate::error::{AppError, Result};
use crate::models::user::UserResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// 资源所有者或管理员
    OwnerOrAdmin,
    /// 仅资源所有者，管理员也不能绕过（通知）
    OwnerOnly,
    /// 仅管理员（分类、评论审核）
    AdminOnly,
}

/// `owner_id` 为 None 表示资源没有所有者（例如分类）
pub fn can_mutate(actor: &UserResponse, owner_id: Option<&str>, access: Access) -> bool {
    let is_owner = owner_id.map_or(false, |owner| owner == actor.id);
    match access {
        Access::OwnerOrAdmin => is_owner || actor.is_admin(),
        Access::OwnerOnly => is_owner,
        Access::AdminOnly => actor.is_admin(),
    }
}

/// 不满足时返回 Forbidden，`action` 形如 "update this blog"
pub fn ensure_can_mutate(
    actor: &UserResponse,
    owner_id: Option<&str>,
    access: Access,
    action: &str,
) -> Result<()> {
    if can_mutate(actor, owner_id, access) {
        return Ok(());
    }

    tracing::warn!(
        "User {} ({}) denied: {} ({:?})",
        actor.id,
        actor.role.as_str(),
        action,
        access
    );

    let message = match access {
        Access::AdminOnly => format!("Only admins can {}", action),
        _ => format!("Not authorized to {}", action),
    };
    Err(AppError::Authorization(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use chrono::Utc;

    fn actor(id: &str, role: Role) -> UserResponse {
        UserResponse {
            id: id.to_string(),
            username: format!("user_{}", id),
            name: String::new(),
            email: format!("{}@example.com", id),
            profile_image: String::new(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_or_admin() {
        let owner = actor("a", Role::User);
        let other = actor("b", Role::User);
        let admin = actor("c", Role::Admin);

        assert!(can_mutate(&owner, Some("a"), Access::OwnerOrAdmin));
        assert!(!can_mutate(&other, Some("a"), Access::OwnerOrAdmin));
        assert!(can_mutate(&admin, Some("a"), Access::OwnerOrAdmin));
    }

    #[test]
    fn test_owner_only_has_no_admin_bypass() {
        let owner = actor("a", Role::User);
        let admin = actor("c", Role::Admin);

        assert!(can_mutate(&owner, Some("a"), Access::OwnerOnly));
        assert!(!can_mutate(&admin, Some("a"), Access::OwnerOnly));
    }

    #[test]
    fn test_admin_only() {
        let user = actor("a", Role::User);
        let admin = actor("c", Role::Admin);

        assert!(!can_mutate(&user, None, Access::AdminOnly));
        assert!(!can_mutate(&user, Some("a"), Access::AdminOnly));
        assert!(can_mutate(&admin, None, Access::AdminOnly));
    }

    #[test]
    fn test_missing_owner_is_not_owned() {
        let user = actor("a", Role::User);
        assert!(!can_mutate(&user, None, Access::OwnerOrAdmin));
        assert!(!can_mutate(&user, None, Access::OwnerOnly));
    }

    #[test]
    fn test_ensure_returns_forbidden() {
        let user = actor("a", Role::User);
        let err = ensure_can_mutate(&user, None, Access::AdminOnly, "create categories").unwrap_err();
        match err {
            AppError::Authorization(msg) => assert_eq!(msg, "Only admins can create categories"),
            other => panic!("unexpected error: {:?}", other),
        }

        let err = ensure_can_mutate(&user, Some("b"), Access::OwnerOrAdmin, "update this blog")
            .unwrap_err();
        match err {
            AppError::Authorization(msg) => assert_eq!(msg, "Not authorized to update this blog"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
