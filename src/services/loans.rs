//! Loan screens: all loans (admin), my loans, overdue loans

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::{
    api::{RequestContext, ResourceQuery},
    error::{AppError, AppResult},
    models::{
        borrow::{Borrow, CreateBorrow, UpdateBorrow},
        BorrowStatus,
    },
    repository::Repository,
};

use super::{precheck, Mutation, ViewModel};

/// Which loans a screen lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanScope {
    All,
    Mine,
    Overdue,
}

/// Counts shown above a loan list and on dashboards
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanSummary {
    pub active: usize,
    pub overdue: usize,
    pub returned: usize,
    pub outstanding_fines: Decimal,
}

impl LoanSummary {
    pub fn from_loans(loans: &[Borrow], now: DateTime<Utc>) -> Self {
        let mut summary = LoanSummary::default();
        for loan in loans {
            match loan.display_status(now) {
                BorrowStatus::Dipinjam => summary.active += 1,
                BorrowStatus::Terlambat => {
                    summary.active += 1;
                    summary.overdue += 1;
                }
                BorrowStatus::Dikembalikan => summary.returned += 1,
            }
            if !loan.is_terminal() {
                summary.outstanding_fines += loan.fine_amount.unwrap_or_default();
            }
        }
        summary
    }
}

pub struct LoansScreen {
    repository: Repository,
    scope: LoanScope,
    pub loans: ViewModel<Borrow>,
}

fn query_for(repository: &Repository, scope: LoanScope) -> ResourceQuery<Borrow> {
    match scope {
        LoanScope::All => repository.loans.list_query(),
        LoanScope::Mine => repository.loans.my_query(),
        LoanScope::Overdue => repository.loans.overdue_query(),
    }
}

impl LoansScreen {
    pub fn new(repository: Repository, scope: LoanScope, page_size: usize) -> Self {
        let loans = ViewModel::new(query_for(&repository, scope), page_size);
        Self {
            repository,
            scope,
            loans,
        }
    }

    pub fn scope(&self) -> LoanScope {
        self.scope
    }

    pub async fn mount(&self, ctx: &RequestContext) -> AppResult<()> {
        self.loans.refresh(ctx).await.map(|_| ())
    }

    pub fn unmount(&self) {
        self.loans.unmount();
    }

    pub fn summary(&self, now: DateTime<Utc>) -> LoanSummary {
        LoanSummary::from_loans(&self.loans.items(), now)
    }

    /// Find a listed loan that can still change.
    fn open_loan(&self, id: i64) -> AppResult<Borrow> {
        let result = match self.loans.items().iter().find(|l| l.id == id) {
            None => Err(AppError::ValidationFailed(format!("Loan {} is not in the list", id))),
            Some(loan) if loan.is_terminal() => Err(AppError::ValidationFailed(
                "This loan has already been returned".to_string(),
            )),
            Some(loan) => Ok(loan.clone()),
        };
        if let Err(e) = &result {
            self.loans.report(e);
        }
        result
    }

    /// Return a borrowed book after the user confirms.
    ///
    /// A loan that is already returned is rejected before any request.
    pub async fn return_loan(
        &self,
        ctx: &RequestContext,
        id: i64,
        now: DateTime<Utc>,
        confirm: impl FnOnce(&str) -> bool,
    ) -> AppResult<Option<Mutation<()>>> {
        let loan = self.open_loan(id)?;
        let label = loan.book_title().map(str::to_string).unwrap_or_else(|| format!("loan #{}", id));
        if !confirm(&format!("Mark \"{}\" as returned?", label)) {
            return Ok(None);
        }

        tracing::info!("Returning loan {}", id);
        self.loans
            .mutate(
                ctx,
                |loans| {
                    if let Some(l) = loans.iter_mut().find(|l| l.id == id) {
                        l.status = BorrowStatus::Dikembalikan;
                        l.return_date = Some(now);
                    }
                },
                self.repository.loans.return_loan(ctx, id),
                |_, _| {},
            )
            .await
            .map(Some)
    }

    /// Move the due date of an open loan
    pub async fn extend_due_date(
        &self,
        ctx: &RequestContext,
        id: i64,
        due_date: DateTime<Utc>,
    ) -> AppResult<Mutation<()>> {
        let loan = self.open_loan(id)?;
        if due_date <= loan.borrow_date {
            let err = AppError::ValidationFailed("Due date must be after the borrow date".to_string());
            self.loans.report(&err);
            return Err(err);
        }

        let update = UpdateBorrow {
            due_date: Some(due_date),
            status: None,
        };
        self.loans
            .mutate(
                ctx,
                |loans| {
                    if let Some(l) = loans.iter_mut().find(|l| l.id == id) {
                        l.due_date = due_date;
                    }
                },
                self.repository.loans.update(ctx, id, &update),
                |_, _| {},
            )
            .await
    }

    pub async fn create_borrow(&self, ctx: &RequestContext, request: &CreateBorrow) -> AppResult<Mutation<Option<Borrow>>> {
        precheck(&self.loans, request)?;

        self.loans
            .mutate(
                ctx,
                |_| {},
                self.repository.loans.create(ctx, request),
                |loans, created| {
                    if let Some(created) = created {
                        loans.push(created.clone());
                    }
                },
            )
            .await
    }
}
