//! Reusable collection query bound to one endpoint

use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use super::{ApiClient, Page, RequestContext};
use crate::error::AppResult;

/// GET query for one collection endpoint, decoded as `T`
pub struct ResourceQuery<T> {
    client: ApiClient,
    path: String,
    params: Vec<(&'static str, String)>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceQuery<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            path: self.path.clone(),
            params: self.params.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for ResourceQuery<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceQuery")
            .field("path", &self.path)
            .field("params", &self.params)
            .finish()
    }
}

impl<T: DeserializeOwned> ResourceQuery<T> {
    pub fn new(client: ApiClient, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
            params: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.push((key, value.into()));
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// One GET; no retry.
    pub async fn fetch(&self, ctx: &RequestContext) -> AppResult<Page<T>> {
        self.client.fetch_page(ctx, &self.path, &self.params).await
    }
}
