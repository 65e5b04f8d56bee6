//! Book (catalog entry) model and related types

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Book category (flat, no hierarchy)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Book as returned by the catalog endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub available_copies: i32,
}

impl Book {
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Short book representation nested in loans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookShort {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
}

impl From<&Book> for BookShort {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: Some(book.author.clone()),
        }
    }
}

/// Create or edit book form
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookForm {
    #[validate(custom(function = "super::not_blank", message = "Title is required"))]
    pub title: String,
    #[validate(custom(function = "super::not_blank", message = "Author is required"))]
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Selected category ids
    #[serde(rename = "categories")]
    #[validate(length(min = 1, message = "Select at least one category"))]
    pub category_ids: Vec<i64>,
    #[validate(range(min = 0, message = "Available copies cannot be negative"))]
    pub available_copies: i32,
}

impl BookForm {
    /// Prefill the edit form from an existing record.
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            description: book.description.clone(),
            category_ids: book.categories.iter().map(|c| c.id).collect(),
            available_copies: book.available_copies,
        }
    }
}
