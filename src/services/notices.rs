//! Overdue-loan notification and its persisted "read" flag

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppResult;

const FILE_NAME: &str = "notifications.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct ReadState {
    /// Overdue loan ids the member has already seen
    acknowledged: Vec<i64>,
}

/// Notification shown on the member dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverdueNotice {
    pub loan_ids: Vec<i64>,
    pub unread: bool,
}

impl OverdueNotice {
    pub fn message(&self) -> String {
        match self.loan_ids.len() {
            1 => "You have 1 overdue loan. Please return it as soon as possible.".to_string(),
            n => format!("You have {} overdue loans. Please return them as soon as possible.", n),
        }
    }
}

/// File-backed store of the notification read flag
#[derive(Debug, Clone)]
pub struct NoticeStore {
    path: PathBuf,
}

impl NoticeStore {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(FILE_NAME),
        }
    }

    fn read_state(&self) -> ReadState {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable {}: {}", self.path.display(), e);
                ReadState::default()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => ReadState::default(),
            Err(e) => {
                tracing::warn!("Cannot read {}: {}", self.path.display(), e);
                ReadState::default()
            }
        }
    }

    /// Build the notice for the current overdue loans, `None` when there are none.
    /// It is unread as soon as an overdue loan has not been acknowledged.
    pub fn overdue_notice(&self, overdue_ids: &[i64]) -> Option<OverdueNotice> {
        if overdue_ids.is_empty() {
            return None;
        }
        let state = self.read_state();
        let unread = overdue_ids.iter().any(|id| !state.acknowledged.contains(id));
        let mut loan_ids = overdue_ids.to_vec();
        loan_ids.sort_unstable();
        Some(OverdueNotice { loan_ids, unread })
    }

    pub fn mark_read(&self, notice: &OverdueNotice) -> AppResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let state = ReadState {
            acknowledged: notice.loan_ids.clone(),
        };
        fs::write(&self.path, serde_json::to_vec_pretty(&state)?)?;
        Ok(())
    }
}
