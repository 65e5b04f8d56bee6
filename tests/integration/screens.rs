//! Screen behavior against a scripted API

use chrono::Duration;
use serde_json::json;

use pustaka_client::{
    api::{Method, RequestContext},
    models::{BorrowStatus, StatusFilter},
    services::{loans::LoanScope, FetchOutcome, ViewModel},
    AppError,
};

use crate::common::{self, book, ctx, loan, now, FakeTransport};

#[tokio::test]
async fn test_mount_normalizes_paged_envelope() {
    let fake = FakeTransport::new();
    fake.respond(
        Method::Get,
        "/books",
        200,
        Some(json!({
            "data": [book(1, "Laskar Pelangi"), book(2, "Sang Pemimpi")],
            "meta": { "total": 12, "totalPages": 2 }
        })),
    );
    let catalog = common::services(&fake, "paged").catalog();
    fake.respond(Method::Get, "/categories", 200, Some(json!([{ "id": 1, "name": "Novel" }])));

    catalog.mount(&ctx()).await.unwrap();

    let state = catalog.books.snapshot();
    assert!(state.loaded);
    assert_eq!(state.items.len(), 2);
    assert_eq!(state.total_pages, 2);
    assert_eq!(state.total_count, 12);
    assert_eq!(catalog.categories.items().len(), 1);
}

#[tokio::test]
async fn test_stale_fetch_never_overwrites_newer() {
    let fake = FakeTransport::new();
    let release_first = fake.respond_gated(Method::Get, "/books", 200, Some(json!([book(1, "Old")])));
    fake.respond(Method::Get, "/books", 200, Some(json!([book(2, "New")])));

    let view = ViewModel::new(common::repository(&fake).books.list_query(), 10);
    let ctx = ctx();

    let (first, second) = tokio::join!(view.refresh(&ctx), async {
        let outcome = view.refresh(&ctx).await;
        let _ = release_first.send(());
        outcome
    });

    assert_eq!(first.unwrap(), FetchOutcome::Superseded);
    assert_eq!(second.unwrap(), FetchOutcome::Committed);
    let items = view.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "New");
}

#[tokio::test]
async fn test_unmount_cancels_in_flight_fetch() {
    let fake = FakeTransport::new();
    let _held = fake.respond_gated(Method::Get, "/borrows/my", 200, Some(json!([])));

    let loans = common::services(&fake, "unmount").loans(LoanScope::Mine);
    let ctx = ctx();
    let (result, _) = tokio::join!(loans.mount(&ctx), async {
        tokio::task::yield_now().await;
        loans.unmount();
    });

    assert!(matches!(result, Err(AppError::Cancelled)));
    assert!(!loans.loans.snapshot().loaded);
    // Later fetches are refused outright.
    assert!(matches!(loans.mount(&ctx).await, Err(AppError::Cancelled)));
    assert_eq!(fake.count(Method::Get, "/borrows/my"), 1);
}

#[tokio::test]
async fn test_no_token_sends_nothing() {
    let fake = FakeTransport::new();
    let catalog = common::services(&fake, "anon").catalog();

    let result = catalog.books.refresh(&RequestContext::anonymous()).await;
    assert!(matches!(result, Err(AppError::AuthMissing)));
    assert!(fake.requests().is_empty());
    assert!(catalog.books.snapshot().error.is_some());
}

#[tokio::test]
async fn test_failed_delete_rolls_back() {
    let fake = FakeTransport::new();
    fake.respond(Method::Get, "/books", 200, Some(json!([book(1, "Laskar Pelangi"), book(2, "Ronggeng")])));
    fake.respond(Method::Delete, "/books/1", 500, Some(json!({ "message": "Buku sedang dipinjam" })));

    let catalog = common::services(&fake, "rollback").catalog();
    catalog.books.refresh(&ctx()).await.unwrap();

    let mut asked = String::new();
    let err = catalog
        .delete_book(&ctx(), 1, |prompt| {
            asked = prompt.to_string();
            true
        })
        .await
        .unwrap_err();

    assert_eq!(asked, "Delete \"Laskar Pelangi\"?");
    assert!(matches!(err, AppError::RequestFailed { status: 500, .. }));
    let state = catalog.books.snapshot();
    assert_eq!(state.items.len(), 2);
    assert_eq!(state.error.unwrap().message, "Buku sedang dipinjam");
    assert!(!state.submitting);
    // No reconciling fetch after a failure.
    assert_eq!(fake.count(Method::Get, "/books"), 1);
}

#[tokio::test]
async fn test_delete_declined_sends_nothing() {
    let fake = FakeTransport::new();
    fake.respond(Method::Get, "/books", 200, Some(json!([book(1, "Laskar Pelangi")])));
    let catalog = common::services(&fake, "declined").catalog();
    catalog.books.refresh(&ctx()).await.unwrap();

    let outcome = catalog.delete_book(&ctx(), 1, |_| false).await.unwrap();
    assert!(outcome.is_none());
    assert_eq!(fake.count(Method::Delete, "/books/1"), 0);
    assert_eq!(catalog.books.items().len(), 1);
}

#[tokio::test]
async fn test_successful_delete_patches_then_reconciles() {
    let fake = FakeTransport::new();
    fake.respond(Method::Get, "/books", 200, Some(json!([book(1, "A"), book(2, "B")])));
    fake.respond(Method::Delete, "/books/1", 204, None);
    fake.respond(Method::Get, "/books", 200, Some(json!({ "data": [book(2, "B"), book(3, "C")], "total": 2 })));

    let catalog = common::services(&fake, "reconcile").catalog();
    catalog.books.refresh(&ctx()).await.unwrap();

    let mutation = catalog.delete_book(&ctx(), 1, |_| true).await.unwrap().unwrap();
    let ids: Vec<i64> = catalog.books.items().iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![2]);

    let outcome = mutation.reconcile.await.unwrap().unwrap();
    assert_eq!(outcome, FetchOutcome::Committed);
    let ids: Vec<i64> = catalog.books.items().iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[tokio::test]
async fn test_invalid_form_is_rejected_before_request() {
    let fake = FakeTransport::new();
    let catalog = common::services(&fake, "form").catalog();

    let form = pustaka_client::models::book::BookForm {
        title: "   ".to_string(),
        author: "Pramoedya".to_string(),
        description: None,
        category_ids: vec![1],
        available_copies: 1,
    };
    let err = catalog.create_book(&ctx(), &form).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationFailed(_)));
    assert!(fake.requests().is_empty());
}

#[tokio::test]
async fn test_remove_favorite_by_favorite_id() {
    let fake = FakeTransport::new();
    fake.respond(
        Method::Get,
        "/favorites/user/2",
        200,
        Some(json!([
            { "id": 30, "userId": 2, "bookId": 7 },
            { "id": 31, "userId": 2, "bookId": 7 }
        ])),
    );
    fake.respond(Method::Delete, "/favorites/31", 200, Some(json!({ "message": "ok" })));

    let favorites = common::services(&fake, "favorites").favorites(2);
    favorites.mount(&ctx()).await.unwrap();

    favorites.remove(&ctx(), 31, |_| true).await.unwrap().unwrap();

    assert_eq!(fake.count(Method::Delete, "/favorites/31"), 1);
    assert_eq!(fake.count(Method::Delete, "/favorites/7"), 0);
    let left: Vec<i64> = favorites.favorites.items().iter().map(|f| f.id).collect();
    assert_eq!(left, vec![30]);
}

#[tokio::test]
async fn test_return_of_returned_loan_is_rejected_locally() {
    let fake = FakeTransport::new();
    fake.respond(
        Method::Get,
        "/borrows",
        200,
        Some(json!([loan(1, "Dikembalikan", now() - Duration::days(3))])),
    );
    let loans = common::services(&fake, "returned").loans(LoanScope::All);
    loans.mount(&ctx()).await.unwrap();

    let err = loans.return_loan(&ctx(), 1, now(), |_| true).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationFailed(_)));
    assert_eq!(fake.requests().len(), 1);
}

#[tokio::test]
async fn test_return_loan_marks_returned() {
    let fake = FakeTransport::new();
    fake.respond(
        Method::Get,
        "/borrows",
        200,
        Some(json!([loan(1, "Dipinjam", now() - Duration::days(3))])),
    );
    fake.respond(Method::Put, "/borrows/1/return", 200, Some(json!({ "message": "returned" })));

    let loans = common::services(&fake, "return").loans(LoanScope::All);
    loans.mount(&ctx()).await.unwrap();
    assert_eq!(loans.summary(now()).overdue, 1);

    loans.return_loan(&ctx(), 1, now(), |_| true).await.unwrap().unwrap();

    let items = loans.loans.items();
    assert_eq!(items[0].status, BorrowStatus::Dikembalikan);
    assert_eq!(items[0].return_date, Some(now()));
}

#[tokio::test]
async fn test_overdue_filter_uses_derived_status() {
    let fake = FakeTransport::new();
    fake.respond(
        Method::Get,
        "/borrows",
        200,
        Some(json!([
            loan(1, "Dipinjam", now() - Duration::days(1)),
            loan(2, "Dipinjam", now() + Duration::days(5)),
            loan(3, "Dikembalikan", now() - Duration::days(9)),
        ])),
    );
    let loans = common::services(&fake, "overdue").loans(LoanScope::All);
    loans.mount(&ctx()).await.unwrap();

    loans.loans.set_status(StatusFilter::Only(BorrowStatus::Terlambat));
    let visible = loans.loans.visible(now());
    let ids: Vec<i64> = visible.items.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![1]);
}

#[tokio::test]
async fn test_password_mismatch_sends_nothing() {
    let fake = FakeTransport::new();
    let profile = common::services(&fake, "password").profile();
    let request = pustaka_client::models::user::ChangePassword {
        current_password: "lama123".to_string(),
        new_password: "baru1234".to_string(),
        confirm_password: "baru4321".to_string(),
    };

    let err = profile.change_password(&ctx(), &request).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationFailed(_)));
    assert!(fake.requests().is_empty());
}

#[tokio::test]
async fn test_review_average() {
    let fake = FakeTransport::new();
    fake.respond(
        Method::Get,
        "/reviews/book/7",
        200,
        Some(json!({ "data": [
            { "userId": 1, "bookId": 7, "rating": 4 },
            { "userId": 2, "bookId": 7, "rating": 5 }
        ] })),
    );
    fake.respond(Method::Post, "/reviews", 201, Some(json!({ "message": "created" })));

    let reviews = common::services(&fake, "reviews").reviews();
    reviews.load(&ctx(), 7).await.unwrap();
    assert_eq!(reviews.average(7), Some(4.5));

    let review = pustaka_client::models::review::Review {
        user_id: 2,
        book_id: 7,
        rating: 2,
        comment: None,
    };
    reviews.submit(&ctx(), &review).await.unwrap();
    assert_eq!(reviews.rating_by(2, 7), Some(2));
    assert_eq!(reviews.average(7), Some(3.0));
    assert_eq!(reviews.average(8), None);
}
