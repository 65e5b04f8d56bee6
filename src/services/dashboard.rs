//! Landing pages of both route trees

use std::fmt;

use chrono::{DateTime, Utc};

use crate::{
    api::RequestContext,
    error::AppResult,
    models::borrow::Borrow,
    repository::Repository,
};

use super::{
    loans::LoanSummary,
    notices::{NoticeStore, OverdueNotice},
};

const RECENT_LOANS: usize = 5;

/// Admin landing page
#[derive(Debug, Clone)]
pub struct AdminDashboard {
    pub books: usize,
    pub members: usize,
    pub loans: LoanSummary,
    pub recent_loans: Vec<Borrow>,
    pub now: DateTime<Utc>,
}

impl AdminDashboard {
    pub async fn load(repository: &Repository, ctx: &RequestContext, now: DateTime<Utc>) -> AppResult<Self> {
        let (books, members, loans) = tokio::try_join!(
            repository.books.list(ctx),
            repository.users.list(ctx),
            repository.loans.list(ctx),
        )?;

        let mut recent_loans = loans.items.clone();
        recent_loans.sort_by(|a, b| b.borrow_date.cmp(&a.borrow_date));
        recent_loans.truncate(RECENT_LOANS);

        Ok(Self {
            books: books.total_count,
            members: members.total_count,
            loans: LoanSummary::from_loans(&loans.items, now),
            recent_loans,
            now,
        })
    }
}

impl fmt::Display for AdminDashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Admin dashboard ==")?;
        writeln!(f, "Books:           {}", self.books)?;
        writeln!(f, "Members:         {}", self.members)?;
        writeln!(f, "Active loans:    {}", self.loans.active)?;
        writeln!(f, "Overdue loans:   {}", self.loans.overdue)?;
        writeln!(f, "Outstanding fines: Rp {}", self.loans.outstanding_fines)?;
        if !self.recent_loans.is_empty() {
            writeln!(f, "Recent loans:")?;
            for loan in &self.recent_loans {
                writeln!(
                    f,
                    "  #{} {} by {} [{}] due {}",
                    loan.id,
                    loan.book_title().unwrap_or("?"),
                    loan.user.as_ref().map(|u| u.username.as_str()).unwrap_or("?"),
                    loan.display_status(self.now),
                    loan.due_date.format("%Y-%m-%d"),
                )?;
            }
        }
        Ok(())
    }
}

/// Member landing page
#[derive(Debug, Clone)]
pub struct UserDashboard {
    pub loans: LoanSummary,
    pub open_loans: Vec<Borrow>,
    pub favorites: usize,
    pub notice: Option<OverdueNotice>,
    pub now: DateTime<Utc>,
}

impl UserDashboard {
    pub async fn load(
        repository: &Repository,
        notices: &NoticeStore,
        ctx: &RequestContext,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        let (loans, favorites) = tokio::try_join!(
            repository.loans.my_loans(ctx),
            repository.favorites.for_user(ctx, user_id),
        )?;

        let overdue_ids: Vec<i64> = loans
            .items
            .iter()
            .filter(|l| l.is_overdue(now))
            .map(|l| l.id)
            .collect();

        Ok(Self {
            loans: LoanSummary::from_loans(&loans.items, now),
            open_loans: loans.items.iter().filter(|l| !l.is_terminal()).cloned().collect(),
            favorites: favorites.total_count,
            notice: notices.overdue_notice(&overdue_ids),
            now,
        })
    }
}

impl fmt::Display for UserDashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== My library ==")?;
        if let Some(notice) = self.notice.as_ref().filter(|n| n.unread) {
            writeln!(f, "(!) {}", notice.message())?;
        }
        writeln!(f, "Borrowed:  {}", self.loans.active)?;
        writeln!(f, "Overdue:   {}", self.loans.overdue)?;
        writeln!(f, "Favorites: {}", self.favorites)?;
        for loan in &self.open_loans {
            let late = loan.days_overdue(self.now);
            write!(
                f,
                "  {} [{}] due {}",
                loan.book_title().unwrap_or("?"),
                loan.display_status(self.now),
                loan.due_date.format("%Y-%m-%d"),
            )?;
            if late > 0 {
                write!(f, " ({} days late)", late)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
