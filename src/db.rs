use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::SqliteConnection;

use crate::config::AppConfig;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

const CREATE_SRS_ITEMS: &str = "
CREATE TABLE IF NOT EXISTS srs_items (
    item_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    owner_id INTEGER NOT NULL,
    original_content TEXT NOT NULL,
    answer_content TEXT,
    study_plan_id TEXT,
    task_id TEXT,
    last_reviewed_at TIMESTAMP,
    next_review_at TIMESTAMP NOT NULL,
    current_interval INTEGER NOT NULL DEFAULT 1 CHECK (current_interval >= 1),
    ease_factor DOUBLE NOT NULL DEFAULT 2.5 CHECK (ease_factor >= 1.3),
    repetitions INTEGER NOT NULL DEFAULT 0 CHECK (repetitions >= 0),
    lapses INTEGER NOT NULL DEFAULT 0 CHECK (lapses >= 0),
    source TEXT NOT NULL DEFAULT 'manual',
    tags TEXT NOT NULL DEFAULT '[]',
    version INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMP NOT NULL,
    updated_at TIMESTAMP NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_srs_items_owner_due ON srs_items (owner_id, next_review_at);
";

/// Applies per-connection pragmas whenever the pool hands a connection out
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas {
    busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;",
            self.busy_timeout.as_millis()
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn build_pool(config: &AppConfig) -> Result<DbPool, r2d2::Error> {
    let manager = ConnectionManager::<SqliteConnection>::new(&config.database_url);
    Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(config.connection_timeout)
        .connection_customizer(Box::new(SqlitePragmas {
            busy_timeout: config.busy_timeout,
        }))
        .build(manager)
}

/// Creates the schema if it does not exist yet
pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    let mut conn = pool.get()?;
    conn.batch_execute(CREATE_SRS_ITEMS)?;
    log::info!("Database schema is up to date");
    Ok(())
}
