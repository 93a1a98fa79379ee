use serde::{Deserialize, Serialize};

use crate::mvi::SliceState;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Kind of warehouse transaction listed on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionKind {
    Import,
    Export,
    StockCheck,
}

/// Transient dashboard view state: which transactions are listed and
/// which page of the remote result is shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub kind: Option<TransactionKind>,
    pub search: String,
    /// 1-based page index.
    pub page: u32,
    pub page_size: u32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            kind: None,
            search: String::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SliceState for SessionState {}

impl SessionState {
    /// Zero-based offset of the first row on the current page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}
