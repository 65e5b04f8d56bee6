//! Shared domain enums

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Account role, selects the admin or user route tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Parse a role claim. Unknown roles get the least privilege.
    pub fn from_claim(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Role::User => "user",
            Role::Admin => "admin",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// BorrowStatus
// ---------------------------------------------------------------------------

/// Loan status as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BorrowStatus {
    /// On loan
    Dipinjam,
    /// Returned
    Dikembalikan,
    /// Overdue
    Terlambat,
}

impl std::fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BorrowStatus::Dipinjam => "Dipinjam",
            BorrowStatus::Dikembalikan => "Dikembalikan",
            BorrowStatus::Terlambat => "Terlambat",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// StatusFilter
// ---------------------------------------------------------------------------

/// Status filter of a list screen; `All` keeps every record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(BorrowStatus),
}

impl StatusFilter {
    pub fn accepts(&self, status: BorrowStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "All" | "all" => Ok(StatusFilter::All),
            "Dipinjam" => Ok(StatusFilter::Only(BorrowStatus::Dipinjam)),
            "Dikembalikan" => Ok(StatusFilter::Only(BorrowStatus::Dikembalikan)),
            "Terlambat" => Ok(StatusFilter::Only(BorrowStatus::Terlambat)),
            other => Err(format!("Unknown status filter: {}", other)),
        }
    }
}
