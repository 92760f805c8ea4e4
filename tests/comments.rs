mod common;

use common::spawn_app;
use quill_blog::models::comment::CreateCommentRequest;
use quill_blog::models::notification::NotificationType;
use quill_blog::AppError;

fn request(blog_id: &str, text: &str) -> CreateCommentRequest {
    CreateCommentRequest {
        blog_id: blog_id.to_string(),
        text: text.to_string(),
    }
}

#[tokio::test]
async fn comment_appends_id_and_notifies_owner() {
    let app = spawn_app().await;
    let admin = app.admin("root").await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let cars = app.category(&admin, "Cars").await;
    let blog = app.blog(&alice, "X", &cars).await;

    let comment = app
        .state
        .comment_service
        .create(&bob, request(&blog.blog.id, "  Nice post  "))
        .await
        .unwrap();
    assert_eq!(comment.comment.content, "Nice post");
    assert_eq!(comment.user.as_ref().map(|u| u.id.as_str()), Some(bob.id.as_str()));

    let details = app.state.blog_service.get(&blog.blog.id).await.unwrap();
    assert_eq!(details.blog.comments, vec![comment.comment.id.clone()]);
    assert_eq!(details.comment_list.len(), 1);

    let notifications = app.state.notification_service.list(&alice).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].notification.notification_type, NotificationType::Comment);
    assert_eq!(notifications[0].notification.message, "commented on your blog \"X\"");
}

#[tokio::test]
async fn owner_comment_creates_no_notification() {
    let app = spawn_app().await;
    let admin = app.admin("root").await;
    let alice = app.user("alice").await;
    let cars = app.category(&admin, "Cars").await;
    let blog = app.blog(&alice, "X", &cars).await;

    app.state
        .comment_service
        .create(&alice, request(&blog.blog.id, "Thanks for reading"))
        .await
        .unwrap();

    let details = app.state.blog_service.get(&blog.blog.id).await.unwrap();
    assert_eq!(details.blog.comments.len(), 1);
    assert!(app.state.notification_service.list(&alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn comment_validation_errors() {
    let app = spawn_app().await;
    let admin = app.admin("root").await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let cars = app.category(&admin, "Cars").await;
    let blog = app.blog(&alice, "X", &cars).await;

    let missing = uuid::Uuid::new_v4().to_string();
    assert!(matches!(
        app.state.comment_service.create(&bob, request(&blog.blog.id, "   ")).await,
        Err(AppError::BadRequest(_))
    ));
    // 博客先于正文校验
    assert!(matches!(
        app.state.comment_service.create(&bob, request(&missing, "   ")).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        app.state.comment_service.create(&bob, request("nope", "hello")).await,
        Err(AppError::BadRequest(_))
    ));
    assert!(matches!(
        app.state.comment_service.create(&bob, request(&missing, "hello")).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn comments_listed_oldest_first() {
    let app = spawn_app().await;
    let admin = app.admin("root").await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let cars = app.category(&admin, "Cars").await;
    let blog = app.blog(&alice, "X", &cars).await;

    for text in ["first", "second", "third"] {
        app.state
            .comment_service
            .create(&bob, request(&blog.blog.id, text))
            .await
            .unwrap();
    }

    let comments = app.state.comment_service.list_for_blog(&blog.blog.id).await.unwrap();
    let texts: Vec<&str> = comments.iter().map(|c| c.comment.content.as_str()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn admin_lists_all_comments_with_titles() {
    let app = spawn_app().await;
    let admin = app.admin("root").await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let cars = app.category(&admin, "Cars").await;
    let blog = app.blog(&alice, "X", &cars).await;

    app.state
        .comment_service
        .create(&bob, request(&blog.blog.id, "hello"))
        .await
        .unwrap();

    assert!(matches!(
        app.state.comment_service.list_all(&bob).await,
        Err(AppError::Authorization(_))
    ));

    let all = app.state.comment_service.list_all(&admin).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].blog_title.as_deref(), Some("X"));
}

#[tokio::test]
async fn deleting_comment_removes_it_from_blog() {
    let app = spawn_app().await;
    let admin = app.admin("root").await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let carol = app.user("carol").await;
    let cars = app.category(&admin, "Cars").await;
    let blog = app.blog(&alice, "X", &cars).await;

    let first = app
        .state
        .comment_service
        .create(&bob, request(&blog.blog.id, "first"))
        .await
        .unwrap();
    let second = app
        .state
        .comment_service
        .create(&bob, request(&blog.blog.id, "second"))
        .await
        .unwrap();

    assert!(matches!(
        app.state.comment_service.delete(&carol, &first.comment.id).await,
        Err(AppError::Authorization(_))
    ));

    app.state.comment_service.delete(&bob, &first.comment.id).await.unwrap();
    app.state.comment_service.delete(&admin, &second.comment.id).await.unwrap();

    let details = app.state.blog_service.get(&blog.blog.id).await.unwrap();
    assert!(details.blog.comments.is_empty());
    assert!(details.comment_list.is_empty());

    assert!(matches!(
        app.state.comment_service.delete(&bob, &first.comment.id).await,
        Err(AppError::NotFound(_))
    ));
}
