mod common;

use common::{form, image, spawn_app};
use quill_blog::models::blog::{BlogQuery, SearchQuery};
use quill_blog::models::category::CategoryRequest;
use quill_blog::AppError;

#[tokio::test]
async fn only_owner_or_admin_may_update_or_delete_blog() {
    let app = spawn_app().await;
    let admin = app.admin("root").await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let cars = app.category(&admin, "Cars").await;
    let blog = app.blog(&alice, "X", &cars).await;

    let result = app
        .state
        .blog_service
        .update(&bob, &blog.blog.id, form("Hijacked", &cars.id), None)
        .await;
    assert!(matches!(result, Err(AppError::Authorization(_))));

    // 拒绝时没有写入任何内容
    let unchanged = app.state.blog_service.get(&blog.blog.id).await.unwrap();
    assert_eq!(unchanged.blog.title, "X");

    assert!(matches!(
        app.state.blog_service.delete(&bob, &blog.blog.id).await,
        Err(AppError::Authorization(_))
    ));

    let updated = app
        .state
        .blog_service
        .update(&admin, &blog.blog.id, form("Y", &cars.id), None)
        .await
        .unwrap();
    assert_eq!(updated.blog.title, "Y");
    assert_eq!(updated.blog.image, blog.blog.image);

    app.state.blog_service.delete(&alice, &blog.blog.id).await.unwrap();
}

#[tokio::test]
async fn update_with_new_image_replaces_old_file() {
    let app = spawn_app().await;
    let admin = app.admin("root").await;
    let alice = app.user("alice").await;
    let cars = app.category(&admin, "Cars").await;
    let blog = app.blog(&alice, "X", &cars).await;

    let old_path = app
        .uploads
        .path()
        .join(blog.blog.image.trim_start_matches("uploads/"));
    assert!(old_path.exists());

    let updated = app
        .state
        .blog_service
        .update(&alice, &blog.blog.id, form("X", &cars.id), Some(image()))
        .await
        .unwrap();
    assert_ne!(updated.blog.image, blog.blog.image);
    assert!(!old_path.exists());
}

#[tokio::test]
async fn create_requires_image_and_existing_category() {
    let app = spawn_app().await;
    let admin = app.admin("root").await;
    let alice = app.user("alice").await;
    let cars = app.category(&admin, "Cars").await;

    assert!(matches!(
        app.state.blog_service.create(&alice, form("X", &cars.id), None).await,
        Err(AppError::BadRequest(_))
    ));

    let missing = uuid::Uuid::new_v4().to_string();
    assert!(matches!(
        app.state.blog_service.create(&alice, form("X", &missing), Some(image())).await,
        Err(AppError::BadRequest(_))
    ));

    let mut blank = form("X", &cars.id);
    blank.title = "   ".to_string();
    assert!(app
        .state
        .blog_service
        .create(&alice, blank, Some(image()))
        .await
        .is_err());
}

#[tokio::test]
async fn deleted_category_leaves_dangling_reference() {
    let app = spawn_app().await;
    let admin = app.admin("root").await;
    let alice = app.user("alice").await;
    let cars = app.category(&admin, "Cars").await;
    let blog = app.blog(&alice, "X", &cars).await;
    assert_eq!(blog.category.as_ref().map(|c| c.name.as_str()), Some("Cars"));

    app.state.category_service.delete(&admin, &cars.id).await.unwrap();

    let details = app.state.blog_service.get(&blog.blog.id).await.unwrap();
    assert_eq!(details.blog.category_id, cars.id);
    assert!(details.category.is_none());

    let json = serde_json::to_value(&details).unwrap();
    assert!(json["category"].is_null());
}

#[tokio::test]
async fn categories_are_admin_only_and_unique() {
    let app = spawn_app().await;
    let admin = app.admin("root").await;
    let alice = app.user("alice").await;

    let request = |name: &str| CategoryRequest { name: name.to_string() };

    assert!(matches!(
        app.state.category_service.create(&alice, request("Cars")).await,
        Err(AppError::Authorization(_))
    ));

    let cars = app.state.category_service.create(&admin, request("Cars")).await.unwrap();
    assert!(matches!(
        app.state.category_service.create(&admin, request(" Cars ")).await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        app.state.category_service.create(&admin, request("  ")).await,
        Err(AppError::BadRequest(_))
    ));

    let travel = app.state.category_service.create(&admin, request("Travel")).await.unwrap();
    assert!(matches!(
        app.state.category_service.update(&admin, &travel.id, request("Cars")).await,
        Err(AppError::Conflict(_))
    ));

    let renamed = app
        .state
        .category_service
        .update(&admin, &cars.id, request("Automobiles"))
        .await
        .unwrap();
    assert_eq!(renamed.name, "Automobiles");

    let names: Vec<String> = app
        .state
        .category_service
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Automobiles", "Travel"]);

    let missing = uuid::Uuid::new_v4().to_string();
    assert!(matches!(
        app.state.category_service.delete(&admin, &missing).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn list_filters_and_search() {
    let app = spawn_app().await;
    let admin = app.admin("root").await;
    let alice = app.user("alice").await;
    let cars = app.category(&admin, "Cars").await;
    let travel = app.category(&admin, "Travel").await;

    let first = app.blog(&alice, "Fast Cars", &cars).await;
    let second = app.blog(&alice, "Slow Boats", &travel).await;
    let third = app.blog(&alice, "Electric cars", &cars).await;

    let all = app.state.blog_service.list(BlogQuery::default()).await.unwrap();
    let ids: Vec<&str> = all.iter().map(|b| b.blog.id.as_str()).collect();
    assert_eq!(ids, vec![third.blog.id.as_str(), second.blog.id.as_str(), first.blog.id.as_str()]);

    let by_category = app
        .state
        .blog_service
        .list(BlogQuery {
            category: Some(cars.id.clone()),
            exclude: Some(third.blog.id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].blog.id, first.blog.id);

    let searched = app
        .state
        .blog_service
        .list(BlogQuery {
            search: Some("BOATS".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].blog.id, second.blog.id);

    let found = app
        .state
        .blog_service
        .search(SearchQuery { q: Some("cars".to_string()) })
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].blog.id, third.blog.id);

    assert!(matches!(
        app.state.blog_service.search(SearchQuery { q: None }).await,
        Err(AppError::BadRequest(_))
    ));
}

#[tokio::test]
async fn blogs_by_user_requires_owner_or_admin() {
    let app = spawn_app().await;
    let admin = app.admin("root").await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let cars = app.category(&admin, "Cars").await;
    app.blog(&alice, "X", &cars).await;

    assert_eq!(app.state.blog_service.list_by_user(&alice, &alice.id).await.unwrap().len(), 1);
    assert_eq!(app.state.blog_service.list_by_user(&admin, &alice.id).await.unwrap().len(), 1);
    assert!(matches!(
        app.state.blog_service.list_by_user(&bob, &alice.id).await,
        Err(AppError::Authorization(_))
    ));
    assert!(matches!(
        app.state.blog_service.list_by_user(&alice, "bad-id").await,
        Err(AppError::BadRequest(_))
    ));

    assert_eq!(app.state.blog_service.public_by_user(&alice.id).await.unwrap().len(), 1);
    assert!(app.state.blog_service.public_by_user(&bob.id).await.unwrap().is_empty());
}
