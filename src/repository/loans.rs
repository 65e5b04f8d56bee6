//! Loan endpoints: `/borrows`

use serde_json::json;

use crate::{
    api::{ApiClient, Method, Page, RequestContext, ResourceQuery},
    error::AppResult,
    models::borrow::{Borrow, CreateBorrow, UpdateBorrow},
};

#[derive(Clone)]
pub struct LoansRepository {
    client: ApiClient,
}

impl LoansRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// All loans (admin)
    pub fn list_query(&self) -> ResourceQuery<Borrow> {
        ResourceQuery::new(self.client.clone(), "/borrows")
    }

    /// Loans of the signed-in member
    pub fn my_query(&self) -> ResourceQuery<Borrow> {
        ResourceQuery::new(self.client.clone(), "/borrows/my")
    }

    /// Loans the server reports as overdue
    pub fn overdue_query(&self) -> ResourceQuery<Borrow> {
        ResourceQuery::new(self.client.clone(), "/borrows/overdue")
    }

    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Page<Borrow>> {
        self.list_query().fetch(ctx).await
    }

    pub async fn my_loans(&self, ctx: &RequestContext) -> AppResult<Page<Borrow>> {
        self.my_query().fetch(ctx).await
    }

    pub async fn overdue(&self, ctx: &RequestContext) -> AppResult<Page<Borrow>> {
        self.overdue_query().fetch(ctx).await
    }

    pub async fn create(&self, ctx: &RequestContext, loan: &CreateBorrow) -> AppResult<Option<Borrow>> {
        self.client.send_json(ctx, Method::Post, "/borrows", loan).await
    }

    pub async fn update(&self, ctx: &RequestContext, id: i64, update: &UpdateBorrow) -> AppResult<()> {
        self.client
            .send_unit(ctx, Method::Put, &format!("/borrows/{}", id), Some(update))
            .await
    }

    /// Return a borrowed book
    pub async fn return_loan(&self, ctx: &RequestContext, id: i64) -> AppResult<()> {
        self.client
            .send_unit(ctx, Method::Put, &format!("/borrows/{}/return", id), Some(&json!({})))
            .await
    }
}
