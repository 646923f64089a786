use async_trait::async_trait;

use crate::models::{Settings, Watch, WatchState};
use crate::utils::error::Result;

pub mod sqlite;

pub use sqlite::SqliteStore;

/// Narrow view of the record store the checker needs.
///
/// Watches and settings are created elsewhere; the checker only reads them
/// and writes back check results.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WatchStore: Send + Sync {
    /// Singleton settings row. A missing row reads as blank credentials.
    async fn load_settings(&self) -> Result<Settings>;

    /// All watches with `enabled = 1`, ordered by id.
    async fn enabled_watches(&self) -> Result<Vec<Watch>>;

    async fn get_watch(&self, id: i64) -> Result<Option<Watch>>;

    /// Natural-key lookup. When `(url, model)` is duplicated the lowest id wins.
    async fn find_watch(&self, url: &str, model: &str) -> Result<Option<Watch>>;

    async fn record_check(&self, id: i64, state: &WatchState) -> Result<()>;

    async fn record_notified(&self, id: i64, notified_at: i64) -> Result<()>;
}
