//! Live API tests against a running library server
//!
//! Run with: PUSTAKA_API_URL=http://localhost:3000/api cargo test -- --ignored

use std::sync::Arc;

use chrono::Utc;

use pustaka_client::{
    api::{ApiClient, HttpTransport},
    config::ApiConfig,
    repository::Repository,
    services::{Session, RouteTree},
};

fn live_repository() -> Repository {
    let config = ApiConfig {
        base_url: std::env::var("PUSTAKA_API_URL").unwrap_or_else(|_| "http://localhost:3000/api".to_string()),
        ..ApiConfig::default()
    };
    let transport = HttpTransport::new(&config).expect("Failed to build transport");
    Repository::new(ApiClient::new(Arc::new(transport)))
}

/// Helper to sign in as the seeded admin
async fn admin_session(repository: &Repository) -> Session {
    let login = repository
        .users
        .login("admin", "admin123")
        .await
        .expect("Failed to sign in");
    Session::decode(&login.token, Utc::now()).expect("Undecodable token")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_login_routes_admin() {
    let repository = live_repository();
    let session = admin_session(&repository).await;
    assert_eq!(RouteTree::for_session(Some(&session)), RouteTree::Admin);
}

#[tokio::test]
#[ignore]
async fn test_list_books() {
    let repository = live_repository();
    let session = admin_session(&repository).await;

    let page = repository
        .books
        .list(&session.context())
        .await
        .expect("Failed to list books");
    assert!(page.total_pages >= 1);
    assert!(page.total_count >= page.items.len());
}

#[tokio::test]
#[ignore]
async fn test_me_matches_session() {
    let repository = live_repository();
    let session = admin_session(&repository).await;

    let me = repository
        .users
        .me(&session.context())
        .await
        .expect("Failed to load profile");
    assert!(me.is_admin());
}

#[tokio::test]
#[ignore]
async fn test_wrong_password_is_rejected() {
    let repository = live_repository();
    let result = repository.users.login("admin", "definitely-wrong").await;
    assert!(result.is_err());
}
