//! Favorite (member/book join record) model

use serde::{Deserialize, Serialize};

use super::book::Book;

/// Favorite record. Its own `id` identifies it for deletion, not `book_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    #[serde(default)]
    pub book: Option<Book>,
}

/// Add favorite request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFavorite {
    pub book_id: i64,
    pub user_id: i64,
}
