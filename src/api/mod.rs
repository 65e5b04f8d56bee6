//! HTTP boundary to the remote library API

pub mod envelope;
pub mod query;
pub mod transport;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};

pub use envelope::{Envelope, Page};
pub use query::ResourceQuery;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};

/// Per-call request context carrying the bearer token.
///
/// The token is passed explicitly to every call instead of being read from
/// ambient storage, so a fake context is enough to test any screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    token: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let token = token.into();
        if token.trim().is_empty() {
            return Self::anonymous();
        }
        Self { token: Some(token) }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The bearer token, or `AuthMissing` when there is none.
    pub fn bearer(&self) -> AppResult<&str> {
        self.token.as_deref().ok_or(AppError::AuthMissing)
    }
}

/// Typed client over a [`Transport`]
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn execute(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<Value>,
    ) -> AppResult<Option<Value>> {
        // No token means no request at all.
        let token = ctx.bearer()?;
        self.dispatch(Some(token.to_string()), method, path, query, body)
            .await
    }

    async fn dispatch(
        &self,
        token: Option<String>,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<Value>,
    ) -> AppResult<Option<Value>> {
        let request = ApiRequest {
            method,
            path: path.to_string(),
            query,
            token,
            body,
        };
        tracing::debug!("{} {}", request.method, request.path);

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            tracing::debug!("{} {} failed with status {}", method, path, response.status);
            return Err(AppError::from_status(response.status, response.server_message()));
        }
        Ok(response.body)
    }

    /// GET a collection and normalize its envelope.
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<Page<T>> {
        let query = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        let body = self
            .execute(ctx, Method::Get, path, query, None)
            .await?
            .ok_or_else(|| AppError::InvalidResponseShape("empty body".to_string()))?;
        envelope::normalize_list(body)
    }

    /// GET a single record.
    pub async fn fetch_one<T: DeserializeOwned>(&self, ctx: &RequestContext, path: &str) -> AppResult<T> {
        let body = self
            .execute(ctx, Method::Get, path, Vec::new(), None)
            .await?
            .ok_or_else(|| AppError::InvalidResponseShape("empty body".to_string()))?;
        envelope::normalize_single(body)
    }

    /// Send a JSON body. The answer is the written record when the server
    /// returns one; a 2xx without a record (e.g. `{ "message": ... }`) is
    /// still a success and yields `None`.
    pub async fn send_json<B, T>(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        body: &B,
    ) -> AppResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let answer = self.execute(ctx, method, path, Vec::new(), Some(body)).await?;
        Ok(answer.and_then(|answer| match envelope::normalize_single(answer) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!("{} {} answered without a record: {}", method, path, e);
                None
            }
        }))
    }

    /// Send a request whose answer body is not needed.
    pub async fn send_unit<B>(&self, ctx: &RequestContext, method: Method, path: &str, body: Option<&B>) -> AppResult<()>
    where
        B: Serialize + ?Sized,
    {
        let body = body.map(serde_json::to_value).transpose()?;
        self.execute(ctx, method, path, Vec::new(), body).await?;
        Ok(())
    }

    pub async fn delete(&self, ctx: &RequestContext, path: &str) -> AppResult<()> {
        self.send_unit::<Value>(ctx, Method::Delete, path, None).await
    }

    /// POST without a bearer token. Only sign-in uses this.
    pub async fn post_anonymous<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let answer = self
            .dispatch(None, Method::Post, path, Vec::new(), Some(body))
            .await?
            .ok_or_else(|| AppError::InvalidResponseShape("empty body".to_string()))?;
        envelope::normalize_single(answer)
    }
}
