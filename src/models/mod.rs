//! Data models for the remote library API

pub mod book;
pub mod borrow;
pub mod enums;
pub mod favorite;
pub mod review;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookShort, Category};
pub use borrow::{is_overdue, Borrow};
pub use enums::{BorrowStatus, Role, StatusFilter};
pub use favorite::Favorite;
pub use review::Review;
pub use user::{Member, UserShort};

use validator::ValidationError;

/// Reject strings that are empty once trimmed.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be empty".into());
        return Err(err);
    }
    Ok(())
}
