use crate::{
    error::{AppError, Result},
    models::{notification::*, user::UserResponse},
    services::{
        policy::{ensure_can_mutate, Access},
        Database, UserService,
    },
    utils::validation,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

/// 通知只通过点赞和评论产生（见 BlogService / CommentService 的事务），
/// 这里负责查询、已读和删除
#[derive(Clone)]
pub struct NotificationService {
    db: Arc<Database>,
    user_service: UserService,
}

impl NotificationService {
    pub async fn new(db: Arc<Database>, user_service: UserService) -> Result<Self> {
        Ok(Self { db, user_service })
    }

    /// 当前用户收到的通知，最新的在前
    pub async fn list(&self, actor: &UserResponse) -> Result<Vec<NotificationWithSender>> {
        let mut notifications: Vec<Notification> = self
            .db
            .find_where(
                "notification",
                "recipient_id = $recipient",
                json!({ "recipient": actor.id }),
            )
            .await?;
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let sender_ids: Vec<String> = notifications.iter().map(|n| n.sender_id.clone()).collect();
        let senders = self.user_service.summaries(&sender_ids).await?;

        Ok(notifications
            .into_iter()
            .map(|notification| NotificationWithSender {
                from: senders.get(&notification.sender_id).cloned(),
                notification,
            })
            .collect())
    }

    pub async fn unread_count(&self, actor: &UserResponse) -> Result<UnreadCount> {
        let unread = self
            .db
            .count_where(
                "notification",
                "recipient_id = $recipient AND is_read = false",
                json!({ "recipient": actor.id }),
            )
            .await?;
        Ok(UnreadCount { unread })
    }

    /// 标记为已读，可重复调用
    pub async fn mark_read(&self, actor: &UserResponse, notification_id: &str) -> Result<Notification> {
        let notification = self.owned(actor, notification_id, "update this notification").await?;
        if notification.is_read {
            return Ok(notification);
        }

        let updated: Option<Notification> = self
            .db
            .merge_by_id("notification", &notification.id, json!({ "is_read": true }))
            .await?;
        debug!("Notification {} marked as read", notification.id);
        updated.ok_or_else(|| AppError::not_found("Notification"))
    }

    pub async fn mark_all_read(&self, actor: &UserResponse) -> Result<()> {
        self.db
            .query_with_params(
                "UPDATE notification SET is_read = true WHERE recipient_id = $recipient AND is_read = false",
                json!({ "recipient": actor.id }),
            )
            .await?;
        info!("All notifications marked as read for {}", actor.id);
        Ok(())
    }

    pub async fn delete(&self, actor: &UserResponse, notification_id: &str) -> Result<()> {
        let notification = self.owned(actor, notification_id, "delete this notification").await?;
        self.db.delete_by_id("notification", &notification.id).await?;
        debug!("Notification {} deleted", notification.id);
        Ok(())
    }

    pub async fn delete_all(&self, actor: &UserResponse) -> Result<()> {
        self.db
            .query_with_params(
                "DELETE notification WHERE recipient_id = $recipient",
                json!({ "recipient": actor.id }),
            )
            .await?;
        info!("All notifications deleted for {}", actor.id);
        Ok(())
    }

    /// 通知只属于接收者本人，管理员也不能代为操作
    async fn owned(&self, actor: &UserResponse, notification_id: &str, action: &str) -> Result<Notification> {
        let notification_id = validation::parse_id("notification", notification_id)?;
        let notification: Notification = self
            .db
            .get_by_id("notification", &notification_id)
            .await?
            .ok_or_else(|| AppError::not_found("Notification"))?;

        ensure_can_mutate(actor, Some(&notification.recipient_id), Access::OwnerOnly, action)?;
        Ok(notification)
    }
}
