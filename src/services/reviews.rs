//! Ratings panel of the book detail screen

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use validator::Validate;

use crate::{api::RequestContext, error::AppResult, models::review::Review, repository::Repository};

/// Submitted ratings, kept per book for the lifetime of the panel
#[derive(Clone)]
pub struct ReviewsPanel {
    repository: Repository,
    cache: Arc<Mutex<HashMap<i64, Vec<Review>>>>,
}

impl ReviewsPanel {
    pub fn new(repository: Repository) -> Self {
        Self {
            repository,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn with_cache<R>(&self, f: impl FnOnce(&mut HashMap<i64, Vec<Review>>) -> R) -> R {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut cache)
    }

    /// Load the ratings of a book into the cache
    pub async fn load(&self, ctx: &RequestContext, book_id: i64) -> AppResult<Vec<Review>> {
        let page = self.repository.reviews.for_book(ctx, book_id).await?;
        self.with_cache(|cache| cache.insert(book_id, page.items.clone()));
        Ok(page.items)
    }

    /// Validate and send a rating; a member's newer rating replaces the older one.
    pub async fn submit(&self, ctx: &RequestContext, review: &Review) -> AppResult<()> {
        review.validate()?;
        self.repository.reviews.submit(ctx, review).await?;

        self.with_cache(|cache| {
            let reviews = cache.entry(review.book_id).or_default();
            reviews.retain(|r| r.user_id != review.user_id);
            reviews.push(review.clone());
        });
        tracing::debug!("Rated book {} with {}", review.book_id, review.rating);
        Ok(())
    }

    pub fn reviews_for(&self, book_id: i64) -> Vec<Review> {
        self.with_cache(|cache| cache.get(&book_id).cloned().unwrap_or_default())
    }

    pub fn rating_by(&self, user_id: i64, book_id: i64) -> Option<u8> {
        self.with_cache(|cache| {
            cache
                .get(&book_id)
                .and_then(|reviews| reviews.iter().find(|r| r.user_id == user_id))
                .map(|r| r.rating)
        })
    }

    /// Mean rating of a book, `None` without ratings
    pub fn average(&self, book_id: i64) -> Option<f64> {
        self.with_cache(|cache| {
            let reviews = cache.get(&book_id).filter(|r| !r.is_empty())?;
            let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
            Some(f64::from(sum) / reviews.len() as f64)
        })
    }
}
