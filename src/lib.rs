//! Pustaka library management client
//!
//! Client core of the Pustaka library app: fetches catalog, member and loan
//! collections from the REST API, filters and paginates them locally, applies
//! mutations optimistically and gates screens by the signed-in role.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared by all screens
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Wire transport, repository and services from the configuration
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let transport = api::HttpTransport::new(&config.api)?;
        let client = api::ApiClient::new(Arc::new(transport));
        let repository = repository::Repository::new(client);
        let services = services::Services::new(repository, services::SessionStore::new(), &config.ui);

        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
        })
    }
}
