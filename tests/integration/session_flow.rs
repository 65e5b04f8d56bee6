//! Sign-in, role routing and sign-out on 401

use chrono::Duration;
use serde_json::json;

use pustaka_client::{
    api::Method,
    error::NoticeKind,
    services::{
        dashboard::{AdminDashboard, UserDashboard},
        RouteTree,
    },
    AppError,
};

use crate::common::{self, book, loan, now, token, FakeTransport};

#[tokio::test]
async fn test_unauthorized_response_signs_out() {
    let fake = FakeTransport::new();
    fake.respond(Method::Get, "/users", 401, Some(json!({ "message": "Token expired" })));

    let services = common::services(&fake, "signout");
    services.session.sign_in(&token(1, "admin", Duration::hours(1)), now()).unwrap();
    assert_eq!(services.session.route(now()), RouteTree::Admin);

    let members = services.members();
    let err = members.mount(&services.session.context(now())).await.unwrap_err();
    assert!(matches!(err, AppError::AuthExpired));

    let notice = services.session.handle_error(&err);
    assert_eq!(notice.kind, NoticeKind::SignIn);
    assert_eq!(services.session.route(now()), RouteTree::SignIn);
    assert!(!services.session.context(now()).is_authenticated());
}

#[tokio::test]
async fn test_admin_dashboard() {
    let fake = FakeTransport::new();
    fake.respond(Method::Get, "/books", 200, Some(json!({ "data": [book(1, "A")], "total": 40 })));
    fake.respond(Method::Get, "/users", 200, Some(json!([{ "id": 1, "username": "admin", "role": "admin" }])));
    fake.respond(
        Method::Get,
        "/borrows",
        200,
        Some(json!([
            loan(1, "Dipinjam", now() - Duration::days(2)),
            loan(2, "Dipinjam", now() + Duration::days(2)),
        ])),
    );

    let services = common::services(&fake, "admin");
    let session = services.session.sign_in(&token(1, "admin", Duration::hours(1)), now()).unwrap();
    let dashboard = AdminDashboard::load(&services.repository, &session.context(), now()).await.unwrap();

    assert_eq!(dashboard.books, 40);
    assert_eq!(dashboard.members, 1);
    assert_eq!(dashboard.loans.active, 2);
    assert_eq!(dashboard.loans.overdue, 1);
    assert!(dashboard.to_string().contains("Overdue loans:   1"));
}

#[tokio::test]
async fn test_user_dashboard_notice_read_once() {
    let fake = FakeTransport::new();
    for _ in 0..2 {
        fake.respond(
            Method::Get,
            "/borrows/my",
            200,
            Some(json!([loan(5, "Dipinjam", now() - Duration::days(4))])),
        );
        fake.respond(Method::Get, "/favorites/user/2", 200, Some(json!([])));
    }

    let services = common::services(&fake, "user");
    let session = services.session.sign_in(&token(2, "user", Duration::hours(1)), now()).unwrap();
    assert_eq!(services.session.route(now()), RouteTree::User);

    let ctx = session.context();
    let dashboard = UserDashboard::load(&services.repository, &services.notices, &ctx, 2, now())
        .await
        .unwrap();
    let notice = dashboard.notice.clone().unwrap();
    assert!(notice.unread);
    assert_eq!(notice.loan_ids, vec![5]);
    assert!(dashboard.to_string().contains("(4 days late)"));
    services.notices.mark_read(&notice).unwrap();

    let again = UserDashboard::load(&services.repository, &services.notices, &ctx, 2, now())
        .await
        .unwrap();
    assert!(!again.notice.unwrap().unread);
}
