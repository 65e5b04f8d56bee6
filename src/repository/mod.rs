//! Repository layer: one typed accessor per remote resource group

pub mod books;
pub mod favorites;
pub mod loans;
pub mod reviews;
pub mod users;

use crate::api::ApiClient;

/// Main repository struct, one accessor per resource group
#[derive(Clone)]
pub struct Repository {
    pub books: books::BooksRepository,
    pub users: users::UsersRepository,
    pub loans: loans::LoansRepository,
    pub favorites: favorites::FavoritesRepository,
    pub reviews: reviews::ReviewsRepository,
}

impl Repository {
    /// Create a new repository over the given client
    pub fn new(client: ApiClient) -> Self {
        Self {
            books: books::BooksRepository::new(client.clone()),
            users: users::UsersRepository::new(client.clone()),
            loans: loans::LoansRepository::new(client.clone()),
            favorites: favorites::FavoritesRepository::new(client.clone()),
            reviews: reviews::ReviewsRepository::new(client),
        }
    }
}
