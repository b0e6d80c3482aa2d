use anyhow::{Context, Result};
use shared::domain::{Control, ControlPatch};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A control with the same `mainID` (ignoring case) already exists.
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    NotFound,
    /// The patch renames the control onto an id that is already taken.
    Conflict,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn list_controls(&self) -> Result<Vec<Control>> {
        let rows = sqlx::query(
            "SELECT main_id, main_description, domain, scope FROM controls ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list controls")?;
        rows.iter().map(control_from_row).collect()
    }

    pub async fn get_control(&self, main_id: &str) -> Result<Option<Control>> {
        let row = sqlx::query(
            "SELECT main_id, main_description, domain, scope FROM controls WHERE main_id = ?",
        )
        .bind(main_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to load control '{main_id}'"))?;
        row.as_ref().map(control_from_row).transpose()
    }

    pub async fn insert_control(&self, control: &Control) -> Result<InsertOutcome> {
        let result = sqlx::query(
            "INSERT INTO controls (main_id, main_description, domain, scope)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(main_id) DO NOTHING",
        )
        .bind(&control.main_id)
        .bind(&control.main_description)
        .bind(&control.domain)
        .bind(&control.scope)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to insert control '{}'", control.main_id))?;

        if result.rows_affected() == 0 {
            debug!(main_id = %control.main_id, "insert skipped, id already present");
            return Ok(InsertOutcome::Duplicate);
        }
        Ok(InsertOutcome::Inserted)
    }

    pub async fn update_control(&self, main_id: &str, patch: &ControlPatch) -> Result<UpdateOutcome> {
        let result = sqlx::query(
            "UPDATE controls SET
                 main_id = COALESCE(?, main_id),
                 main_description = COALESCE(?, main_description),
                 domain = COALESCE(?, domain),
                 scope = COALESCE(?, scope)
             WHERE main_id = ?",
        )
        .bind(patch.main_id.as_deref())
        .bind(patch.main_description.as_deref())
        .bind(patch.domain.as_deref())
        .bind(patch.scope.as_deref())
        .bind(main_id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Ok(UpdateOutcome::NotFound),
            Ok(_) => Ok(UpdateOutcome::Updated),
            Err(sqlx::Error::Database(db_error)) if db_error.is_unique_violation() => {
                debug!(%main_id, "update rejected, target id already present");
                Ok(UpdateOutcome::Conflict)
            }
            Err(error) => {
                Err(error).with_context(|| format!("failed to update control '{main_id}'"))
            }
        }
    }

    /// Returns whether a row was removed. Deleting an unknown id is not an error.
    pub async fn delete_control(&self, main_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM controls WHERE main_id = ?")
            .bind(main_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete control '{main_id}'"))?;
        Ok(result.rows_affected() > 0)
    }
}

fn control_from_row(row: &SqliteRow) -> Result<Control> {
    Ok(Control {
        main_id: row.try_get("main_id")?,
        main_description: row.try_get("main_description")?,
        domain: row.try_get("domain")?,
        scope: row.try_get("scope")?,
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
