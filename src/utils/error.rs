use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fetch error: {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Parsing error: {message}")]
    Parse { message: String },

    #[error("Delivery error: {0}")]
    Delivery(String),
}

impl AppError {
    /// Network, timeout and non-2xx failures while retrieving a page.
    pub fn is_fetch(&self) -> bool {
        matches!(self, AppError::Fetch { .. } | AppError::Http(_))
    }

    pub fn is_store(&self) -> bool {
        matches!(self, AppError::Database(_) | AppError::Migration(_))
    }

    pub fn is_delivery(&self) -> bool {
        matches!(self, AppError::Delivery(_))
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
