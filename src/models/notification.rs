use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::models::user::UserSummary;
use crate::utils::serde_helpers::record_key;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Like,
    Comment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(with = "record_key")]
    pub id: String,
    /// 接收者
    pub recipient_id: String,
    /// 触发者
    pub sender_id: String,
    pub blog_id: String,
    pub notification_type: NotificationType,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// 点赞/评论产生的通知；自己对自己的操作返回 None
    pub fn for_action(
        notification_type: NotificationType,
        recipient_id: &str,
        sender_id: &str,
        blog_id: &str,
        blog_title: &str,
    ) -> Option<Self> {
        if recipient_id == sender_id {
            return None;
        }

        let message = match notification_type {
            NotificationType::Like => format!("liked your blog \"{}\"", blog_title),
            NotificationType::Comment => format!("commented on your blog \"{}\"", blog_title),
        };

        Some(Self {
            id: uuid::Uuid::new_v4().to_string(),
            recipient_id: recipient_id.to_string(),
            sender_id: sender_id.to_string(),
            blog_id: blog_id.to_string(),
            notification_type,
            message,
            is_read: false,
            created_at: Utc::now(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationWithSender {
    #[serde(flatten)]
    pub notification: Notification,
    /// 触发者已被删除时为 None
    pub from: Option<UserSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadCount {
    pub unread: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_self_notification() {
        assert!(Notification::for_action(NotificationType::Like, "a", "a", "b1", "X").is_none());
    }

    #[test]
    fn test_like_message_embeds_title() {
        let n = Notification::for_action(NotificationType::Like, "owner", "fan", "b1", "X").unwrap();
        assert_eq!(n.message, "liked your blog \"X\"");
        assert_eq!(n.recipient_id, "owner");
        assert_eq!(n.sender_id, "fan");
        assert!(!n.is_read);
    }

    #[test]
    fn test_comment_message_embeds_title() {
        let n = Notification::for_action(NotificationType::Comment, "owner", "fan", "b1", "Cars")
            .unwrap();
        assert_eq!(n.message, "commented on your blog \"Cars\"");
        assert_eq!(n.notification_type, NotificationType::Comment);
    }
}
