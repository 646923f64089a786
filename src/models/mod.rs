use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod settings;
pub mod watch;

// Re-exports for convenience
pub use settings::*;
pub use watch::*;

/// Availability resolved for a watch at one point in time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "TEXT")]
pub enum StockStatus {
    #[sqlx(rename = "IN_STOCK")]
    InStock,
    #[sqlx(rename = "OUT_OF_STOCK")]
    OutOfStock,
    #[sqlx(rename = "UNKNOWN")]
    Unknown,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "IN_STOCK",
            StockStatus::OutOfStock => "OUT_OF_STOCK",
            StockStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN_STOCK" => Ok(StockStatus::InStock),
            "OUT_OF_STOCK" => Ok(StockStatus::OutOfStock),
            "UNKNOWN" => Ok(StockStatus::Unknown),
            other => Err(format!("unknown stock status: {other:?}")),
        }
    }
}
