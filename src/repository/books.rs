//! Catalog endpoints: `/books`, `/categories`

use crate::{
    api::{ApiClient, Method, Page, RequestContext, ResourceQuery},
    error::AppResult,
    models::book::{Book, BookForm, Category},
};

#[derive(Clone)]
pub struct BooksRepository {
    client: ApiClient,
}

impl BooksRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn list_query(&self) -> ResourceQuery<Book> {
        ResourceQuery::new(self.client.clone(), "/books")
    }

    /// Server-side title search
    pub fn search_query(&self, title: &str) -> ResourceQuery<Book> {
        ResourceQuery::new(self.client.clone(), "/books/search").param("title", title)
    }

    /// List books
    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Page<Book>> {
        self.list_query().fetch(ctx).await
    }

    /// Get book by ID
    pub async fn get_by_id(&self, ctx: &RequestContext, id: i64) -> AppResult<Book> {
        self.client.fetch_one(ctx, &format!("/books/{}", id)).await
    }

    pub async fn create(&self, ctx: &RequestContext, form: &BookForm) -> AppResult<Option<Book>> {
        self.client.send_json(ctx, Method::Post, "/books", form).await
    }

    pub async fn update(&self, ctx: &RequestContext, id: i64, form: &BookForm) -> AppResult<Option<Book>> {
        self.client
            .send_json(ctx, Method::Put, &format!("/books/{}", id), form)
            .await
    }

    pub async fn delete(&self, ctx: &RequestContext, id: i64) -> AppResult<()> {
        self.client.delete(ctx, &format!("/books/{}", id)).await
    }

    pub fn categories_query(&self) -> ResourceQuery<Category> {
        ResourceQuery::new(self.client.clone(), "/categories")
    }

    /// List categories
    pub async fn categories(&self, ctx: &RequestContext) -> AppResult<Page<Category>> {
        self.categories_query().fetch(ctx).await
    }
}
