//! Borrow (loan) model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::book::BookShort;
use super::enums::BorrowStatus;
use super::user::UserShort;

/// Overdue predicate shared by every loan screen.
///
/// Only a loan still on loan can be overdue; the result is a display
/// projection and is never sent back to the server.
pub fn is_overdue(status: BorrowStatus, due_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    status == BorrowStatus::Dipinjam && due_date < now
}

/// Loan as returned by `/borrows`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Borrow {
    pub id: i64,
    pub book_id: i64,
    pub user_id: i64,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub return_date: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
    #[serde(default)]
    pub fine_amount: Option<Decimal>,
    #[serde(default)]
    pub book: Option<BookShort>,
    #[serde(default)]
    pub user: Option<UserShort>,
}

impl Borrow {
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        is_overdue(self.status, self.due_date, now)
    }

    /// Status shown to the user
    pub fn display_status(&self, now: DateTime<Utc>) -> BorrowStatus {
        if self.is_overdue(now) {
            BorrowStatus::Terlambat
        } else {
            self.status
        }
    }

    /// A returned loan accepts no further mutation.
    pub fn is_terminal(&self) -> bool {
        self.return_date.is_some() || self.status == BorrowStatus::Dikembalikan
    }

    /// Whole days past the due date, zero when not overdue
    pub fn days_overdue(&self, now: DateTime<Utc>) -> i64 {
        if !self.is_overdue(now) {
            return 0;
        }
        (now - self.due_date).num_days()
    }

    /// Title of the nested book, if the server embedded it
    pub fn book_title(&self) -> Option<&str> {
        self.book.as_ref().map(|b| b.title.as_str())
    }
}

/// Create loan request
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_borrow_dates"))]
pub struct CreateBorrow {
    pub book_id: i64,
    pub user_id: i64,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

fn validate_borrow_dates(borrow: &CreateBorrow) -> Result<(), ValidationError> {
    if borrow.due_date <= borrow.borrow_date {
        let mut err = ValidationError::new("due_date");
        err.message = Some("Due date must be after the borrow date".into());
        return Err(err);
    }
    Ok(())
}

/// Update loan request (admin)
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBorrow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BorrowStatus>,
}
