use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Singleton row holding the Telegram credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Settings {
    pub tg_token: String,
    pub tg_chat_id: String,
}

impl Settings {
    pub fn new(tg_token: impl Into<String>, tg_chat_id: impl Into<String>) -> Self {
        Self {
            tg_token: tg_token.into(),
            tg_chat_id: tg_chat_id.into(),
        }
    }

    /// Both credentials present. Blank values disable notification silently.
    pub fn has_credentials(&self) -> bool {
        !self.tg_token.trim().is_empty() && !self.tg_chat_id.trim().is_empty()
    }
}
