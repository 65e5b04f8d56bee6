//! Patching actions: answers without a record, late answers, rollback

use chrono::Duration;
use serde_json::json;

use pustaka_client::{
    api::Method,
    models::{
        book::BookForm,
        borrow::CreateBorrow,
        BorrowStatus, Role,
    },
    services::{favorites::Toggle, loans::LoanScope, FetchOutcome},
    AppError,
};

use crate::common::{self, book, ctx, loan, now, FakeTransport};

fn form(title: &str) -> BookForm {
    BookForm {
        title: title.to_string(),
        author: "Andrea Hirata".to_string(),
        description: None,
        category_ids: vec![1],
        available_copies: 2,
    }
}

fn titles(catalog: &pustaka_client::services::catalog::CatalogScreen) -> Vec<String> {
    catalog.books.items().iter().map(|b| b.title.clone()).collect()
}

#[tokio::test]
async fn test_update_answered_with_message_keeps_patch() {
    let fake = FakeTransport::new();
    fake.respond(Method::Get, "/books", 200, Some(json!([book(1, "Old")])));
    fake.respond(Method::Put, "/books/1", 200, Some(json!({ "message": "Buku berhasil diperbarui" })));
    fake.respond(Method::Get, "/books", 200, Some(json!([book(1, "New")])));

    let catalog = common::services(&fake, "message-only").catalog();
    let ctx = ctx();
    catalog.books.refresh(&ctx).await.unwrap();

    let mutation = catalog.update_book(&ctx, 1, &form("New")).await.unwrap();
    assert!(mutation.value.is_none());
    assert_eq!(titles(&catalog), vec!["New"]);
    assert!(catalog.books.snapshot().error.is_none());

    assert_eq!(mutation.reconcile.await.unwrap().unwrap(), FetchOutcome::Committed);
    assert_eq!(fake.count(Method::Get, "/books"), 2);
}

#[tokio::test]
async fn test_update_patches_then_settles_with_server_record() {
    let fake = FakeTransport::new();
    fake.respond(Method::Get, "/books", 200, Some(json!([book(1, "Old"), book(2, "Other")])));
    let release = fake.respond_gated(Method::Put, "/books/1", 200, Some(book(1, "New (2nd ed.)")));

    let catalog = common::services(&fake, "settle").catalog();
    let ctx = ctx();
    catalog.books.refresh(&ctx).await.unwrap();

    let new_form = form("New");
    let (result, patched) = tokio::join!(catalog.update_book(&ctx, 1, &new_form), async {
        tokio::task::yield_now().await;
        let patched = titles(&catalog);
        let _ = release.send(());
        patched
    });

    assert_eq!(patched, vec!["New", "Other"]);
    let mutation = result.unwrap();
    assert_eq!(mutation.value.map(|b| b.title), Some("New (2nd ed.)".to_string()));
    assert_eq!(titles(&catalog), vec!["New (2nd ed.)", "Other"]);

    let put = fake
        .requests()
        .into_iter()
        .find(|r| r.method == Method::Put)
        .unwrap();
    assert_eq!(put.body.unwrap()["title"], "New");
}

#[tokio::test]
async fn test_failed_update_rolls_back() {
    let fake = FakeTransport::new();
    fake.respond(Method::Get, "/books", 200, Some(json!([book(1, "Old")])));
    fake.respond(Method::Put, "/books/1", 422, Some(json!({ "message": "Judul sudah dipakai" })));

    let catalog = common::services(&fake, "update-rollback").catalog();
    catalog.books.refresh(&ctx()).await.unwrap();

    let err = catalog.update_book(&ctx(), 1, &form("Taken")).await.unwrap_err();
    assert!(matches!(err, AppError::RequestFailed { status: 422, .. }));
    assert_eq!(titles(&catalog), vec!["Old"]);
    assert_eq!(catalog.books.snapshot().error.unwrap().message, "Judul sudah dipakai");
}

#[tokio::test]
async fn test_late_answer_after_unmount_is_dropped() {
    let fake = FakeTransport::new();
    fake.respond(Method::Get, "/borrows", 200, Some(json!([])));
    let release = fake.respond_gated(
        Method::Post,
        "/borrows",
        201,
        Some(loan(4, "Dipinjam", now() + Duration::days(7))),
    );

    let loans = common::services(&fake, "late-answer").loans(LoanScope::All);
    let ctx = ctx();
    loans.mount(&ctx).await.unwrap();

    let request = CreateBorrow {
        book_id: 14,
        user_id: 2,
        borrow_date: now(),
        due_date: now() + Duration::days(7),
    };
    let (result, _) = tokio::join!(loans.create_borrow(&ctx, &request), async {
        tokio::task::yield_now().await;
        loans.unmount();
        let _ = release.send(());
    });

    assert!(matches!(result, Err(AppError::Cancelled)));
    assert!(loans.loans.items().is_empty());
    tokio::task::yield_now().await;
    // No reconciling fetch for a torn-down view.
    assert_eq!(fake.count(Method::Get, "/borrows"), 1);
}

#[tokio::test]
async fn test_create_borrow() {
    let fake = FakeTransport::new();
    fake.respond(Method::Get, "/borrows", 200, Some(json!([])));
    fake.respond(Method::Post, "/borrows", 201, Some(json!({ "data": loan(4, "Dipinjam", now() + Duration::days(7)) })));

    let loans = common::services(&fake, "create-borrow").loans(LoanScope::All);
    let ctx = ctx();
    loans.mount(&ctx).await.unwrap();

    let backwards = CreateBorrow {
        book_id: 14,
        user_id: 2,
        borrow_date: now(),
        due_date: now() - Duration::days(1),
    };
    let err = loans.create_borrow(&ctx, &backwards).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationFailed(_)));
    assert_eq!(fake.count(Method::Post, "/borrows"), 0);

    let request = CreateBorrow {
        due_date: now() + Duration::days(7),
        ..backwards
    };
    let mutation = loans.create_borrow(&ctx, &request).await.unwrap();
    assert_eq!(mutation.value.map(|l| l.id), Some(4));
    let ids: Vec<i64> = loans.loans.items().iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![4]);

    let post = fake.requests().into_iter().find(|r| r.method == Method::Post).unwrap();
    assert_eq!(post.body.unwrap()["bookId"], 14);
}

#[tokio::test]
async fn test_extend_due_date() {
    let fake = FakeTransport::new();
    fake.respond(
        Method::Get,
        "/borrows",
        200,
        Some(json!([
            loan(1, "Dipinjam", now() + Duration::days(2)),
            loan(2, "Dikembalikan", now() - Duration::days(2)),
        ])),
    );
    fake.respond(Method::Put, "/borrows/1", 200, Some(json!({ "message": "updated" })));

    let loans = common::services(&fake, "extend").loans(LoanScope::All);
    let ctx = ctx();
    loans.mount(&ctx).await.unwrap();
    let open = loans.loans.items()[0].clone();

    let err = loans
        .extend_due_date(&ctx, 2, now() + Duration::days(10))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationFailed(_)));

    let err = loans
        .extend_due_date(&ctx, 1, open.borrow_date - Duration::days(1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationFailed(_)));
    assert_eq!(fake.requests().len(), 1);

    let new_due = now() + Duration::days(9);
    loans.extend_due_date(&ctx, 1, new_due).await.unwrap();
    assert_eq!(loans.loans.items()[0].due_date, new_due);
    assert_eq!(loans.loans.items()[0].status, BorrowStatus::Dipinjam);

    let put = fake.requests().into_iter().find(|r| r.method == Method::Put).unwrap();
    assert_eq!(put.path, "/borrows/1");
    assert!(put.body.unwrap().get("dueDate").is_some());
}

#[tokio::test]
async fn test_search_remote_switches_source() {
    let fake = FakeTransport::new();
    fake.respond(Method::Get, "/books/search", 200, Some(json!([book(5, "Clean Code")])));
    fake.respond(Method::Get, "/books", 200, Some(json!([book(5, "Clean Code"), book(6, "Dirty Code")])));

    let catalog = common::services(&fake, "search").catalog();
    let ctx = ctx();
    catalog.books.set_page(3);

    catalog.search_remote(&ctx, "  clean ").await.unwrap();
    assert_eq!(titles(&catalog), vec!["Clean Code"]);
    assert_eq!(catalog.books.snapshot().query.page, 1);
    let search = &fake.requests()[0];
    assert_eq!(search.path, "/books/search");
    assert_eq!(search.query, vec![("title".to_string(), "clean".to_string())]);

    catalog.search_remote(&ctx, "").await.unwrap();
    assert_eq!(titles(&catalog).len(), 2);
    let list = &fake.requests()[1];
    assert_eq!(list.path, "/books");
    assert!(list.query.is_empty());
}

#[tokio::test]
async fn test_change_role() {
    let fake = FakeTransport::new();
    fake.respond(
        Method::Get,
        "/users",
        200,
        Some(json!([{ "id": 3, "username": "siti", "email": "siti@example.com", "role": "user" }])),
    );
    fake.respond(Method::Put, "/users/3", 200, Some(json!({ "message": "Role diperbarui" })));

    let members = common::services(&fake, "role").members();
    let ctx = ctx();
    members.mount(&ctx).await.unwrap();

    members.change_role(&ctx, 3, Role::Admin).await.unwrap();
    assert_eq!(members.members.items()[0].role, Role::Admin);

    let put = fake.requests().into_iter().find(|r| r.method == Method::Put).unwrap();
    assert_eq!(put.body, Some(json!({ "role": "admin" })));

    let err = members.change_role(&ctx, 99, Role::User).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationFailed(_)));
}

#[tokio::test]
async fn test_toggle_favorite() {
    let fake = FakeTransport::new();
    fake.respond(Method::Get, "/favorites/user/2", 200, Some(json!([])));
    fake.respond(Method::Post, "/favorites", 201, Some(json!({ "id": 40, "userId": 2, "bookId": 7 })));
    fake.respond(Method::Get, "/favorites/user/2", 200, Some(json!([{ "id": 40, "userId": 2, "bookId": 7 }])));
    fake.respond(Method::Delete, "/favorites/40", 204, None);
    fake.respond(Method::Get, "/favorites/user/2", 200, Some(json!([])));

    let favorites = common::services(&fake, "toggle").favorites(2);
    let ctx = ctx();
    favorites.mount(&ctx).await.unwrap();
    let target: pustaka_client::models::Book = serde_json::from_value(book(7, "Bumi Manusia")).unwrap();

    let added = match favorites.toggle(&ctx, &target, |_| true).await.unwrap() {
        Toggle::Added(mutation) => mutation,
        other => panic!("expected Added, got {:?}", other),
    };
    assert_eq!(added.value.as_ref().map(|f| f.id), Some(40));
    // The request body names the member and the book.
    let post = fake.requests().into_iter().find(|r| r.method == Method::Post).unwrap();
    assert_eq!(post.body, Some(json!({ "bookId": 7, "userId": 2 })));
    let listed = favorites.favorite_for(7).unwrap();
    assert_eq!(listed.book.map(|b| b.title), Some("Bumi Manusia".to_string()));
    added.reconcile.await.unwrap().unwrap();

    let kept = favorites.toggle(&ctx, &target, |_| false).await.unwrap();
    assert!(matches!(kept, Toggle::Kept));
    assert_eq!(fake.count(Method::Delete, "/favorites/40"), 0);

    let removed = favorites.toggle(&ctx, &target, |_| true).await.unwrap();
    assert!(matches!(removed, Toggle::Removed(_)));
    assert_eq!(fake.count(Method::Delete, "/favorites/40"), 1);
    assert!(favorites.favorite_for(7).is_none());
}
