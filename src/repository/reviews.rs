//! Review endpoints: `/reviews`

use crate::{
    api::{ApiClient, Method, Page, RequestContext},
    error::AppResult,
    models::review::Review,
};

#[derive(Clone)]
pub struct ReviewsRepository {
    client: ApiClient,
}

impl ReviewsRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn submit(&self, ctx: &RequestContext, review: &Review) -> AppResult<()> {
        self.client
            .send_unit(ctx, Method::Post, "/reviews", Some(review))
            .await
    }

    pub async fn for_book(&self, ctx: &RequestContext, book_id: i64) -> AppResult<Page<Review>> {
        self.client
            .fetch_page(ctx, &format!("/reviews/book/{}", book_id), &[])
            .await
    }
}
