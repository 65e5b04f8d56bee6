//! Favorites screen of one member

use crate::{
    api::RequestContext,
    error::{AppError, AppResult},
    models::{
        book::Book,
        favorite::{AddFavorite, Favorite},
    },
    repository::Repository,
};

use super::{Mutation, ViewModel};

/// Outcome of a favorite toggle
#[derive(Debug)]
pub enum Toggle {
    Added(Mutation<Option<Favorite>>),
    Removed(Mutation<()>),
    /// The user declined the removal
    Kept,
}

pub struct FavoritesScreen {
    repository: Repository,
    user_id: i64,
    pub favorites: ViewModel<Favorite>,
}

impl FavoritesScreen {
    pub fn new(repository: Repository, user_id: i64, page_size: usize) -> Self {
        let favorites = ViewModel::new(repository.favorites.user_query(user_id), page_size);
        Self {
            repository,
            user_id,
            favorites,
        }
    }

    pub async fn mount(&self, ctx: &RequestContext) -> AppResult<()> {
        self.favorites.refresh(ctx).await.map(|_| ())
    }

    pub fn unmount(&self) {
        self.favorites.unmount();
    }

    /// The favorite record for a book, if any
    pub fn favorite_for(&self, book_id: i64) -> Option<Favorite> {
        self.favorites
            .items()
            .iter()
            .find(|f| f.book_id == book_id)
            .cloned()
    }

    pub async fn add(&self, ctx: &RequestContext, book: &Book) -> AppResult<Mutation<Option<Favorite>>> {
        let request = AddFavorite {
            book_id: book.id,
            user_id: self.user_id,
        };

        self.favorites
            .mutate(
                ctx,
                |_| {},
                self.repository.favorites.add(ctx, &request),
                |favorites, created| {
                    if let Some(created) = created {
                        let mut created = created.clone();
                        if created.book.is_none() {
                            created.book = Some(book.clone());
                        }
                        favorites.push(created);
                    }
                },
            )
            .await
    }

    /// Remove one favorite record, addressed by its own id, after the user
    /// confirms.
    pub async fn remove(
        &self,
        ctx: &RequestContext,
        favorite_id: i64,
        confirm: impl FnOnce(&str) -> bool,
    ) -> AppResult<Option<Mutation<()>>> {
        let favorite = self.favorites.items().iter().find(|f| f.id == favorite_id).cloned();
        let Some(favorite) = favorite else {
            let err = AppError::ValidationFailed(format!("Favorite {} is not in the list", favorite_id));
            self.favorites.report(&err);
            return Err(err);
        };

        let title = favorite
            .book
            .as_ref()
            .map(|b| b.title.clone())
            .unwrap_or_else(|| format!("book #{}", favorite.book_id));
        if !confirm(&format!("Remove \"{}\" from favorites?", title)) {
            return Ok(None);
        }

        self.favorites
            .mutate(
                ctx,
                |favorites| favorites.retain(|f| f.id != favorite_id),
                self.repository.favorites.remove(ctx, favorite_id),
                |_, _| {},
            )
            .await
            .map(Some)
    }

    /// Add the book when it is not a favorite yet, otherwise remove its record.
    pub async fn toggle(
        &self,
        ctx: &RequestContext,
        book: &Book,
        confirm: impl FnOnce(&str) -> bool,
    ) -> AppResult<Toggle> {
        match self.favorite_for(book.id) {
            None => self.add(ctx, book).await.map(Toggle::Added),
            Some(favorite) => Ok(match self.remove(ctx, favorite.id, confirm).await? {
                Some(mutation) => Toggle::Removed(mutation),
                None => Toggle::Kept,
            }),
        }
    }
}
