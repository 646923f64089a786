use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::StockStatus;

/// Window used by the management surface when a watch is saved without one.
pub const DEFAULT_WINDOW: usize = 2500;

/// One monitored product page, as stored in the `watches` table.
///
/// Pattern columns are read with NULL folded to an empty string; what an
/// empty pattern means is decided by the resolver, not here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Watch {
    pub id: i64,
    pub url: String,
    pub model: String,

    // Matching rules
    pub count_regex: String,
    pub instock_regex: String,
    pub oos_regex: String,
    pub window: i64,
    pub enabled: bool,

    // Last check
    pub last_status: Option<String>,
    pub last_available: Option<i64>,
    pub last_checked: Option<i64>,
    pub last_notified: Option<i64>,
}

/// Fields written back after every successful check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchState {
    pub status: StockStatus,
    pub available: Option<i64>,
    pub checked_at: i64,
}

impl Watch {
    /// Characters of context taken on each side of the model keyword.
    pub fn window_size(&self) -> usize {
        if self.window > 0 {
            self.window as usize
        } else {
            DEFAULT_WINDOW
        }
    }

    /// Status recorded by the previous check, `None` if never checked.
    ///
    /// An unrecognised value is treated like "never checked" so the next
    /// check always counts as a change.
    pub fn previous_status(&self) -> Option<StockStatus> {
        self.last_status
            .as_deref()
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse().ok())
    }

    pub fn apply(&mut self, state: &WatchState) {
        self.last_status = Some(state.status.as_str().to_string());
        self.last_available = state.available;
        self.last_checked = Some(state.checked_at);
    }
}
