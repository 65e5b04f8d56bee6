//! Favorite endpoints: `/favorites`

use crate::{
    api::{ApiClient, Method, Page, RequestContext, ResourceQuery},
    error::AppResult,
    models::favorite::{AddFavorite, Favorite},
};

#[derive(Clone)]
pub struct FavoritesRepository {
    client: ApiClient,
}

impl FavoritesRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Page<Favorite>> {
        self.client.fetch_page(ctx, "/favorites", &[]).await
    }

    pub fn user_query(&self, user_id: i64) -> ResourceQuery<Favorite> {
        ResourceQuery::new(self.client.clone(), format!("/favorites/user/{}", user_id))
    }

    pub async fn for_user(&self, ctx: &RequestContext, user_id: i64) -> AppResult<Page<Favorite>> {
        self.user_query(user_id).fetch(ctx).await
    }

    pub async fn add(&self, ctx: &RequestContext, favorite: &AddFavorite) -> AppResult<Option<Favorite>> {
        self.client
            .send_json(ctx, Method::Post, "/favorites", favorite)
            .await
    }

    /// Delete by the favorite record's own id
    pub async fn remove(&self, ctx: &RequestContext, favorite_id: i64) -> AppResult<()> {
        self.client
            .delete(ctx, &format!("/favorites/{}", favorite_id))
            .await
    }
}
