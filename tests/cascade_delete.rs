mod common;

use common::spawn_app;
use quill_blog::models::comment::CreateCommentRequest;
use quill_blog::AppError;

fn request(blog_id: &str, text: &str) -> CreateCommentRequest {
    CreateCommentRequest {
        blog_id: blog_id.to_string(),
        text: text.to_string(),
    }
}

#[tokio::test]
async fn deleting_user_cascades_to_owned_records_only() {
    let app = spawn_app().await;
    let admin = app.admin("root").await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let cars = app.category(&admin, "Cars").await;

    let alice_blog = app.blog(&alice, "Alice writes", &cars).await;
    let bob_blog = app.blog(&bob, "Bob writes", &cars).await;

    // alice 在 bob 的博客上评论并点赞，bob 在 alice 的博客上评论
    let alice_comment = app
        .state
        .comment_service
        .create(&alice, request(&bob_blog.blog.id, "from alice"))
        .await
        .unwrap();
    let bob_comment = app
        .state
        .comment_service
        .create(&bob, request(&alice_blog.blog.id, "from bob"))
        .await
        .unwrap();
    app.state.blog_service.toggle_like(&bob, &alice_blog.blog.id).await.unwrap();
    assert_eq!(app.state.notification_service.list(&alice).await.unwrap().len(), 2);

    let image_path = app
        .uploads
        .path()
        .join(alice_blog.blog.image.trim_start_matches("uploads/"));
    assert!(image_path.exists());

    app.state.user_service.delete_user(&alice, &alice.id).await.unwrap();

    assert!(app.state.user_service.get_user(&alice.id).await.unwrap().is_none());
    assert!(matches!(
        app.state.blog_service.get(&alice_blog.blog.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(app.state.notification_service.list(&alice).await.unwrap().is_empty());
    assert!(!image_path.exists());

    // bob 的博客保留，但 alice 的评论已从列表中移除
    let bob_details = app.state.blog_service.get(&bob_blog.blog.id).await.unwrap();
    assert!(!bob_details.blog.comments.contains(&alice_comment.comment.id));
    assert!(bob_details.comment_list.is_empty());

    // bob 在已删除博客上的评论作为孤儿保留
    let orphans = app
        .state
        .comment_service
        .list_for_blog(&alice_blog.blog.id)
        .await
        .unwrap();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].comment.id, bob_comment.comment.id);
}

#[tokio::test]
async fn only_owner_or_admin_may_delete_user() {
    let app = spawn_app().await;
    let admin = app.admin("root").await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;

    assert!(matches!(
        app.state.user_service.delete_user(&bob, &alice.id).await,
        Err(AppError::Authorization(_))
    ));

    app.state.user_service.delete_user(&admin, &alice.id).await.unwrap();
    assert!(matches!(
        app.state.user_service.delete_user(&admin, &alice.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn deleting_blog_removes_comments_and_notifications() {
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
    app.state.blog_service.toggle_like(&bob, &blog.blog.id).await.unwrap();

    app.state.blog_service.delete(&alice, &blog.blog.id).await.unwrap();

    assert!(app
        .state
        .comment_service
        .list_for_blog(&blog.blog.id)
        .await
        .unwrap()
        .is_empty());
    assert!(app.state.notification_service.list(&alice).await.unwrap().is_empty());
}
