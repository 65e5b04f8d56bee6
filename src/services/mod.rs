//! Screen logic over the remote API

pub mod catalog;
pub mod dashboard;
pub mod favorites;
pub mod filter;
pub mod loans;
pub mod members;
pub mod notices;
pub mod profile;
pub mod reviews;
pub mod session;
pub mod view;

use validator::Validate;

use crate::{
    config::UiConfig,
    error::{AppError, AppResult},
    repository::Repository,
};

pub use filter::{filter_paginate, DisplayedRange, ListQuery, Listable, Visible};
pub use session::{RouteTree, Session, SessionStore};
pub use view::{FetchOutcome, Mutation, ViewModel, ViewState};

/// Run client-side checks; failures are shown on `view` and nothing is sent.
pub(crate) fn precheck<T, F>(view: &ViewModel<T>, form: &F) -> AppResult<()>
where
    T: Listable + Clone + serde::de::DeserializeOwned + Send + Sync + 'static,
    F: Validate,
{
    if let Err(errors) = form.validate() {
        let err = AppError::from(errors);
        view.report(&err);
        return Err(err);
    }
    Ok(())
}

/// Container for all screens
#[derive(Clone)]
pub struct Services {
    pub session: SessionStore,
    pub repository: Repository,
    pub notices: notices::NoticeStore,
    page_size: usize,
}

impl Services {
    /// Create the services over the given repository
    pub fn new(repository: Repository, session: SessionStore, ui: &UiConfig) -> Self {
        Self {
            session,
            repository,
            notices: notices::NoticeStore::new(&ui.state_dir),
            page_size: ui.page_size,
        }
    }

    pub fn catalog(&self) -> catalog::CatalogScreen {
        catalog::CatalogScreen::new(self.repository.clone(), self.page_size)
    }

    pub fn members(&self) -> members::MembersScreen {
        members::MembersScreen::new(self.repository.clone(), self.page_size)
    }

    pub fn loans(&self, scope: loans::LoanScope) -> loans::LoansScreen {
        loans::LoansScreen::new(self.repository.clone(), scope, self.page_size)
    }

    pub fn favorites(&self, user_id: i64) -> favorites::FavoritesScreen {
        favorites::FavoritesScreen::new(self.repository.clone(), user_id, self.page_size)
    }

    pub fn reviews(&self) -> reviews::ReviewsPanel {
        reviews::ReviewsPanel::new(self.repository.clone())
    }

    pub fn profile(&self) -> profile::ProfileScreen {
        profile::ProfileScreen::new(self.repository.clone())
    }
}
