/// Database manager for the project store
///
/// Owns the single SQLite database holding projects and workspaces:
/// - {data_dir}/schemaway.db: workspaces, workspace_members, projects
///
/// Schema creation is idempotent and runs on every open.

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DATABASE_FILE: &str = "schemaway.db";

/// Connection pool plus the location it was opened from
#[derive(Debug, Clone)]
pub struct DatabaseManager {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl DatabaseManager {
    /// Open (creating if missing) the store under `data_dir`
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir).map_err(|e| {
            anyhow::anyhow!("Failed to create data directory '{}': {}", data_dir.display(), e)
        })?;
        let db_path = data_dir.join(DATABASE_FILE);

        tracing::info!("🗄️ Opening project database: {}", db_path.display());

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .foreign_keys(true)
            // Membership writes take the write lock up front and wait here for it
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;

        init_schema(&pool).await?;

        tracing::info!("✅ Project database ready: {}", db_path.display());

        Ok(Self { pool, db_path })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Create tables and indexes
///
/// Safe to call multiple times (uses IF NOT EXISTS).
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS workspaces (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS workspace_members (
            workspace_id TEXT NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
            user_id TEXT NOT NULL,
            role TEXT NOT NULL CHECK (role IN ('owner', 'member')),
            joined_at TEXT NOT NULL,
            PRIMARY KEY (workspace_id, user_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Exactly one of user_id / workspace_id identifies the owner
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            engine TEXT NOT NULL,
            document JSON NOT NULL,
            user_id TEXT,
            workspace_id TEXT REFERENCES workspaces(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CHECK ((user_id IS NULL) <> (workspace_id IS NULL))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_members_user ON workspace_members(user_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_projects_user ON projects(user_id, updated_at)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_projects_workspace ON projects(workspace_id, updated_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
