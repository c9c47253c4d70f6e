use anyhow::{Context as _, Result};
use chrono::Local;
use serde::Serialize;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::{path::Path, str::FromStr};

/// A persisted task. The field names double as the wire format — rows
/// serialize directly into response bodies, so they must stay exactly
/// `id`/`titulo`/`descricao`/`status`/`criado_em` for client compatibility.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize)]
pub struct TaskRow {
    pub id: i64,
    pub titulo: String,
    pub descricao: Option<String>,
    pub status: String,
    pub criado_em: String,
}

/// A partial update: only fields carrying `Some` are written.
#[derive(Debug, Default, Clone)]
pub struct TaskPatch {
    pub titulo: Option<String>,
    pub descricao: Option<String>,
    pub status: Option<String>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.titulo.is_none() && self.descricao.is_none() && self.status.is_none()
    }
}

/// Durable CRUD over the task collection, backed by a single-file SQLite
/// database. Each operation is one atomic statement; isolation under
/// concurrent handlers is SQLite's own locking, nothing application-level.
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    /// Open (creating if missing) `{data_dir}/tasks.db` and ensure the
    /// schema exists. Safe to call on every process start.
    ///
    /// `max_connections` caps the pool; handlers past the cap wait for a
    /// free connection rather than opening unbounded handles.
    pub async fn new(data_dir: &Path, max_connections: u32) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let db_path = data_dir.join("tasks.db");
        let opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;
        Self::init_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Idempotent schema init. AUTOINCREMENT keeps ids strictly increasing
    /// and never reused, even across deletes.
    async fn init_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS tasks (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 titulo TEXT NOT NULL,
                 descricao TEXT,
                 status TEXT NOT NULL DEFAULT 'pendente',
                 criado_em TEXT NOT NULL
             )",
        )
        .execute(pool)
        .await
        .context("failed to create tasks table")?;
        Ok(())
    }

    pub async fn create_task(
        &self,
        titulo: &str,
        descricao: Option<&str>,
        status: &str,
    ) -> Result<TaskRow> {
        let criado_em = Local::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO tasks (titulo, descricao, status, criado_em) VALUES (?, ?, ?, ?)",
        )
        .bind(titulo)
        .bind(descricao)
        .bind(status)
        .bind(&criado_em)
        .execute(&self.pool)
        .await?;
        self.get_task(result.last_insert_rowid())
            .await?
            .ok_or_else(|| anyhow::anyhow!("task not found after insert"))
    }

    /// Every task, in insertion order. An empty store yields an empty vec.
    pub async fn list_tasks(&self) -> Result<Vec<TaskRow>> {
        Ok(sqlx::query_as("SELECT * FROM tasks")
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn get_task(&self, id: i64) -> Result<Option<TaskRow>> {
        Ok(sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Apply the fields present in `patch` to one row. Returns `false` when
    /// no task with that id exists.
    ///
    /// Rejecting an empty patch is the caller's job at the request boundary;
    /// reaching storage with one is a logic error.
    pub async fn update_task(&self, id: i64, patch: &TaskPatch) -> Result<bool> {
        anyhow::ensure!(!patch.is_empty(), "empty task patch");

        let mut sets: Vec<&str> = Vec::new();
        if patch.titulo.is_some() {
            sets.push("titulo = ?");
        }
        if patch.descricao.is_some() {
            sets.push("descricao = ?");
        }
        if patch.status.is_some() {
            sets.push("status = ?");
        }

        let sql = format!("UPDATE tasks SET {} WHERE id = ?", sets.join(", "));
        let mut query = sqlx::query(&sql);
        if let Some(titulo) = &patch.titulo {
            query = query.bind(titulo);
        }
        if let Some(descricao) = &patch.descricao {
            query = query.bind(descricao);
        }
        if let Some(status) = &patch.status {
            query = query.bind(status);
        }
        let result = query.bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hard delete. Returns `false` when no task with that id exists.
    pub async fn delete_task(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_tasks(&self) -> Result<u64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0 as u64)
    }
}
