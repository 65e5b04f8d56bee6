//! Per-screen view model: fetch-on-mount, optimistic mutation with rollback,
//! background reconciliation.
//!
//! Every list screen holds one [`ViewModel`]. A fetch replaces the collection
//! wholesale. Only the most recently issued fetch may commit, and nothing is
//! committed once the screen is unmounted. Mutations patch the collection
//! immediately, restore the previous snapshot if the request fails, and
//! re-fetch in the background when it succeeds.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{
    api::{RequestContext, ResourceQuery},
    error::{AppError, AppResult, Notice},
    models::StatusFilter,
    services::filter::{filter_paginate, ListQuery, Listable, Visible},
};

/// What happened to a fetch result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The result replaced the collection
    Committed,
    /// A newer fetch was issued meanwhile; the result was dropped
    Superseded,
}

/// Snapshot of a screen's state
#[derive(Debug, Clone)]
pub struct ViewState<T> {
    pub items: Arc<Vec<T>>,
    pub total_pages: usize,
    pub total_count: usize,
    pub loading: bool,
    pub submitting: bool,
    pub loaded: bool,
    pub error: Option<Notice>,
    pub query: ListQuery,
}

/// Result of a successful mutation
#[derive(Debug)]
pub struct Mutation<R> {
    pub value: R,
    /// Background re-fetch reconciling the patched collection
    pub reconcile: JoinHandle<AppResult<FetchOutcome>>,
}

struct Inner<T> {
    source: Mutex<ResourceQuery<T>>,
    state: Mutex<ViewState<T>>,
    seq: AtomicU64,
    lifetime: watch::Sender<bool>,
}

/// View-model state holder of one screen
pub struct ViewModel<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for ViewModel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Resolve once the view is unmounted.
async fn unmounted(mut lifetime: watch::Receiver<bool>) {
    loop {
        if *lifetime.borrow_and_update() {
            return;
        }
        if lifetime.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl<T> ViewModel<T>
where
    T: Listable + Clone + DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(source: ResourceQuery<T>, page_size: usize) -> Self {
        let (lifetime, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                source: Mutex::new(source),
                state: Mutex::new(ViewState {
                    items: Arc::new(Vec::new()),
                    total_pages: 1,
                    total_count: 0,
                    loading: false,
                    submitting: false,
                    loaded: false,
                    error: None,
                    query: ListQuery::new(page_size),
                }),
                seq: AtomicU64::new(0),
                lifetime,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewState<T>> {
        // A panic while holding the lock leaves plain data behind; keep going.
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> ViewState<T> {
        self.lock().clone()
    }

    pub fn items(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.lock().items)
    }

    pub fn is_unmounted(&self) -> bool {
        *self.inner.lifetime.borrow()
    }

    /// Tear the screen down: cancel in-flight fetches, refuse later commits.
    pub fn unmount(&self) {
        self.inner.lifetime.send_replace(true);
        tracing::debug!("View unmounted");
    }

    /// Point the screen at another endpoint (e.g. server-side search).
    pub fn set_source(&self, source: ResourceQuery<T>) {
        *self.inner.source.lock().unwrap_or_else(|e| e.into_inner()) = source;
    }

    /// Fetch-sync: one GET replacing the collection.
    pub async fn refresh(&self, ctx: &RequestContext) -> AppResult<FetchOutcome> {
        if self.is_unmounted() {
            return Err(AppError::Cancelled);
        }

        let seq = self.inner.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let source = self
            .inner
            .source
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        if !ctx.is_authenticated() {
            // Short-circuit without touching the network.
            let err = AppError::AuthMissing;
            let mut state = self.lock();
            state.loading = false;
            state.error = Some(err.notice());
            return Err(err);
        }

        self.lock().loading = true;

        let lifetime = self.inner.lifetime.subscribe();
        let result = tokio::select! {
            result = source.fetch(ctx) => result,
            _ = unmounted(lifetime) => Err(AppError::Cancelled),
        };

        if self.is_unmounted() {
            tracing::debug!("Dropping response for unmounted view ({})", source.path());
            return Err(AppError::Cancelled);
        }

        let mut state = self.lock();
        if self.inner.seq.load(Ordering::SeqCst) != seq {
            tracing::debug!("Dropping stale response #{} for {}", seq, source.path());
            return match result {
                Err(e) if e.is_auth_expired() => Err(e),
                _ => Ok(FetchOutcome::Superseded),
            };
        }

        state.loading = false;
        match result {
            Ok(page) => {
                tracing::debug!("{}: {} records", source.path(), page.items.len());
                state.items = Arc::new(page.items);
                state.total_pages = page.total_pages;
                state.total_count = page.total_count;
                state.loaded = true;
                state.error = None;
                Ok(FetchOutcome::Committed)
            }
            Err(e) => {
                state.error = Some(e.notice());
                Err(e)
            }
        }
    }

    /// Two-phase mutation.
    ///
    /// `tentative` patches the collection before `request` is sent. On failure
    /// the snapshot taken before the patch is restored, unless a fetch has
    /// replaced the collection in the meantime. On success `settle` applies the
    /// server's answer and a background re-fetch reconciles the collection.
    /// A view unmounted while the request runs is left untouched and the call
    /// resolves to `Cancelled`.
    pub async fn mutate<R, Fut>(
        &self,
        ctx: &RequestContext,
        tentative: impl FnOnce(&mut Vec<T>),
        request: Fut,
        settle: impl FnOnce(&mut Vec<T>, &R),
    ) -> AppResult<Mutation<R>>
    where
        Fut: Future<Output = AppResult<R>>,
    {
        if self.is_unmounted() {
            return Err(AppError::Cancelled);
        }
        if !ctx.is_authenticated() {
            let err = AppError::AuthMissing;
            self.report(&err);
            return Err(err);
        }

        let (snapshot, patched) = {
            let mut state = self.lock();
            if state.submitting {
                return Err(AppError::ValidationFailed(
                    "Another action is still in progress".to_string(),
                ));
            }
            let snapshot = Arc::clone(&state.items);
            let mut next = (*snapshot).clone();
            tentative(&mut next);
            let patched = Arc::new(next);
            state.items = Arc::clone(&patched);
            state.submitting = true;
            state.error = None;
            (snapshot, patched)
        };

        let result = request.await;

        if self.is_unmounted() {
            tracing::debug!("Dropping action result for unmounted view");
            return Err(AppError::Cancelled);
        }

        {
            let mut state = self.lock();
            state.submitting = false;
            let untouched = Arc::ptr_eq(&state.items, &patched);

            match &result {
                Ok(value) => {
                    if untouched {
                        let mut next = (*patched).clone();
                        settle(&mut next, value);
                        state.items = Arc::new(next);
                    }
                }
                Err(e) => {
                    if untouched {
                        tracing::warn!("Action failed, restoring previous state: {}", e);
                        state.items = snapshot;
                    }
                    state.error = Some(e.notice());
                }
            }
        }

        let value = result?;
        let view = self.clone();
        let ctx = ctx.clone();
        let reconcile = tokio::spawn(async move { view.refresh(&ctx).await });

        Ok(Mutation { value, reconcile })
    }

    /// Record an error raised before any request (e.g. validation).
    pub fn report(&self, err: &AppError) {
        self.lock().error = Some(err.notice());
    }

    pub fn clear_error(&self) {
        self.lock().error = None;
    }

    /// New search text; goes back to the first page.
    pub fn set_search(&self, text: impl Into<String>) {
        let mut state = self.lock();
        state.query.search = text.into();
        state.query.page = 1;
    }

    pub fn set_status(&self, status: StatusFilter) {
        let mut state = self.lock();
        state.query.status = status;
        state.query.page = 1;
    }

    pub fn set_page(&self, page: usize) {
        self.lock().query.page = page;
    }

    /// The page to render.
    pub fn visible(&self, now: DateTime<Utc>) -> Visible<T> {
        let (items, query) = {
            let state = self.lock();
            (Arc::clone(&state.items), state.query.clone())
        };
        filter_paginate(&items, &query, now)
    }
}
