use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{Settings, StockStatus};
use crate::resolver::Resolution;
use crate::utils::error::Result;

pub mod telegram;

pub use telegram::TelegramNotifier;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// The message was accepted by the messaging endpoint.
    Sent,
    /// Credentials are blank; nothing was attempted.
    Skipped,
}

/// Hands a formatted message to the messaging channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, settings: &Settings, text: &str) -> Result<NotifyOutcome>;
}

/// Human-readable status line followed by the page URL.
pub fn format_message(model: &str, url: &str, resolution: &Resolution) -> String {
    let status = resolution.status;
    match (status, resolution.count) {
        (_, Some(count)) => format!("[{status}] {model} ({count})\n{url}"),
        (StockStatus::Unknown, None) => format!("[{status}] {model} (regex not matched)\n{url}"),
        (_, None) => format!("[{status}] {model}\n{url}"),
    }
}
