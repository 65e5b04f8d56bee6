//! Book catalog screen

use crate::{
    api::RequestContext,
    error::{AppError, AppResult},
    models::book::{Book, BookForm, Category},
    repository::Repository,
};

use super::{precheck, FetchOutcome, Mutation, ViewModel};

/// Categories are shown in full in the picker.
const CATEGORY_PAGE_SIZE: usize = 1_000;

pub struct CatalogScreen {
    repository: Repository,
    pub books: ViewModel<Book>,
    pub categories: ViewModel<Category>,
}

impl CatalogScreen {
    pub fn new(repository: Repository, page_size: usize) -> Self {
        let books = ViewModel::new(repository.books.list_query(), page_size);
        let categories = ViewModel::new(repository.books.categories_query(), CATEGORY_PAGE_SIZE);
        Self {
            repository,
            books,
            categories,
        }
    }

    /// Load books and categories
    pub async fn mount(&self, ctx: &RequestContext) -> AppResult<()> {
        let (books, categories) = tokio::join!(self.books.refresh(ctx), self.categories.refresh(ctx));
        books?;
        categories?;
        Ok(())
    }

    pub fn unmount(&self) {
        self.books.unmount();
        self.categories.unmount();
    }

    /// Search titles on the server; blank text goes back to the full list.
    pub async fn search_remote(&self, ctx: &RequestContext, title: &str) -> AppResult<FetchOutcome> {
        let title = title.trim();
        if title.is_empty() {
            self.books.set_source(self.repository.books.list_query());
        } else {
            self.books.set_source(self.repository.books.search_query(title));
        }
        self.books.set_page(1);
        self.books.refresh(ctx).await
    }

    /// Book detail
    pub async fn get_book(&self, ctx: &RequestContext, id: i64) -> AppResult<Book> {
        self.repository.books.get_by_id(ctx, id).await
    }

    fn categories_for(&self, ids: &[i64]) -> Vec<Category> {
        self.categories
            .items()
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect()
    }

    pub async fn create_book(&self, ctx: &RequestContext, form: &BookForm) -> AppResult<Mutation<Option<Book>>> {
        precheck(&self.books, form)?;

        self.books
            .mutate(
                ctx,
                |_| {},
                self.repository.books.create(ctx, form),
                |books, created| {
                    if let Some(created) = created {
                        books.push(created.clone());
                    }
                },
            )
            .await
    }

    pub async fn update_book(&self, ctx: &RequestContext, id: i64, form: &BookForm) -> AppResult<Mutation<Option<Book>>> {
        precheck(&self.books, form)?;
        if !self.books.items().iter().any(|b| b.id == id) {
            let err = AppError::ValidationFailed(format!("Book {} is not in the list", id));
            self.books.report(&err);
            return Err(err);
        }

        let categories = self.categories_for(&form.category_ids);
        self.books
            .mutate(
                ctx,
                |books| {
                    if let Some(book) = books.iter_mut().find(|b| b.id == id) {
                        book.title = form.title.clone();
                        book.author = form.author.clone();
                        book.description = form.description.clone();
                        book.available_copies = form.available_copies;
                        book.categories = categories;
                    }
                },
                self.repository.books.update(ctx, id, form),
                |books, updated| {
                    let found = books.iter_mut().find(|b| b.id == id);
                    if let (Some(book), Some(updated)) = (found, updated) {
                        *book = updated.clone();
                    }
                },
            )
            .await
    }

    /// Delete a book after the user confirms.
    pub async fn delete_book(
        &self,
        ctx: &RequestContext,
        id: i64,
        confirm: impl FnOnce(&str) -> bool,
    ) -> AppResult<Option<Mutation<()>>> {
        let title = self
            .books
            .items()
            .iter()
            .find(|b| b.id == id)
            .map(|b| b.title.clone())
            .unwrap_or_else(|| format!("#{}", id));
        if !confirm(&format!("Delete \"{}\"?", title)) {
            return Ok(None);
        }

        self.books
            .mutate(
                ctx,
                |books| books.retain(|b| b.id != id),
                self.repository.books.delete(ctx, id),
                |_, _| {},
            )
            .await
            .map(Some)
    }
}
