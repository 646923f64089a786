use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::DatabaseConfig;
use crate::models::{Settings, Watch, WatchState};
use crate::store::WatchStore;
use crate::utils::error::{AppError, Result};

// Same schema the management surface creates.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS settings(
        id INTEGER PRIMARY KEY CHECK(id=1),
        tg_token TEXT,
        tg_chat_id TEXT
    )
    "#,
    "INSERT OR IGNORE INTO settings(id, tg_token, tg_chat_id) VALUES(1, '', '')",
    r#"
    CREATE TABLE IF NOT EXISTS watches(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        url TEXT NOT NULL,
        model TEXT NOT NULL,
        count_regex TEXT,
        instock_regex TEXT,
        oos_regex TEXT,
        "window" INTEGER NOT NULL DEFAULT 2500,
        enabled INTEGER NOT NULL DEFAULT 1,

        last_status TEXT,
        last_available INTEGER,
        last_checked INTEGER,
        last_notified INTEGER
    )
    "#,
];

const WATCH_COLUMNS: &str = r#"
    id,
    url,
    model,
    IFNULL(count_regex, '') AS count_regex,
    IFNULL(instock_regex, '') AS instock_regex,
    IFNULL(oos_regex, '') AS oos_regex,
    "window" AS "window",
    enabled,
    last_status,
    last_available,
    last_checked,
    last_notified
"#;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database file named in the config.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Private in-memory database. A single connection keeps every query on
    /// the same database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the tables and the blank settings row if they do not exist.
    pub async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::Migration(e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl WatchStore for SqliteStore {
    async fn load_settings(&self) -> Result<Settings> {
        let row = sqlx::query_as::<_, Settings>(
            r#"
            SELECT IFNULL(tg_token, '') AS tg_token, IFNULL(tg_chat_id, '') AS tg_chat_id
            FROM settings
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.unwrap_or_default())
    }

    async fn enabled_watches(&self) -> Result<Vec<Watch>> {
        let sql = format!("SELECT {WATCH_COLUMNS} FROM watches WHERE enabled = 1 ORDER BY id");
        let watches = sqlx::query_as::<_, Watch>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(watches)
    }

    async fn get_watch(&self, id: i64) -> Result<Option<Watch>> {
        let sql = format!("SELECT {WATCH_COLUMNS} FROM watches WHERE id = ?1");
        let watch = sqlx::query_as::<_, Watch>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(watch)
    }

    async fn find_watch(&self, url: &str, model: &str) -> Result<Option<Watch>> {
        let sql = format!(
            "SELECT {WATCH_COLUMNS} FROM watches WHERE url = ?1 AND model = ?2 ORDER BY id LIMIT 1"
        );
        let watch = sqlx::query_as::<_, Watch>(&sql)
            .bind(url)
            .bind(model)
            .fetch_optional(&self.pool)
            .await?;
        Ok(watch)
    }

    async fn record_check(&self, id: i64, state: &WatchState) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE watches
            SET last_status = ?1, last_available = ?2, last_checked = ?3
            WHERE id = ?4
            "#,
        )
        .bind(state.status)
        .bind(state.available)
        .bind(state.checked_at)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_notified(&self, id: i64, notified_at: i64) -> Result<()> {
        sqlx::query("UPDATE watches SET last_notified = ?1 WHERE id = ?2")
            .bind(notified_at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
