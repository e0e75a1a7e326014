use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Executor, Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::{
    domain::{Estado, RepairFields, RepairId, RepairRecord},
    protocol::RepairPatch,
};

const REPAIR_COLUMNS: &str =
    "id, modelo, duenio, sintoma, observacion, tratamiento, estado, created_at";

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every connection to `sqlite::memory:` opens a fresh database, so keep exactly one.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(connect_options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// All repairs, oldest first.
    pub async fn list_repairs(&self) -> Result<Vec<RepairRecord>> {
        self.list_repairs_ordered(true).await
    }

    pub async fn list_repairs_ordered(&self, ascending: bool) -> Result<Vec<RepairRecord>> {
        let direction = if ascending { "ASC" } else { "DESC" };
        let rows = sqlx::query(&format!(
            "SELECT {REPAIR_COLUMNS} FROM reparaciones ORDER BY created_at {direction}, id {direction}"
        ))
        .fetch_all(&self.pool)
        .await
        .context("failed to list reparaciones")?;
        rows.iter().map(repair_from_row).collect()
    }

    pub async fn get_repair(&self, id: RepairId) -> Result<Option<RepairRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {REPAIR_COLUMNS} FROM reparaciones WHERE id = ?"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(repair_from_row).transpose()
    }

    pub async fn insert_repair(&self, fields: &RepairFields) -> Result<RepairRecord> {
        insert_row(&self.pool, fields).await
    }

    /// Inserts every row in one transaction; either all rows are created or none.
    pub async fn insert_repairs(&self, rows: &[RepairFields]) -> Result<Vec<RepairRecord>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin insert transaction")?;
        let mut created = Vec::with_capacity(rows.len());
        for fields in rows {
            created.push(insert_row(&mut *tx, fields).await?);
        }
        tx.commit()
            .await
            .context("failed to commit insert transaction")?;
        Ok(created)
    }

    /// Applies the set columns of `patch`. Returns `false` when no row has `id`.
    pub async fn update_repair(&self, id: RepairId, patch: &RepairPatch) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE reparaciones SET
                modelo      = COALESCE(?1, modelo),
                duenio      = COALESCE(?2, duenio),
                sintoma     = COALESCE(?3, sintoma),
                observacion = COALESCE(?4, observacion),
                tratamiento = COALESCE(?5, tratamiento),
                estado      = COALESCE(?6, estado)
            WHERE id = ?7
            "#,
        )
        .bind(patch.modelo.as_deref())
        .bind(patch.duenio.as_deref())
        .bind(patch.sintoma.as_deref())
        .bind(patch.observacion.as_deref())
        .bind(patch.tratamiento.as_deref())
        .bind(patch.estado.map(Estado::as_str))
        .bind(id.0)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to update reparacion {id}"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns `false` when no row had `id`.
    pub async fn delete_repair(&self, id: RepairId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reparaciones WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete reparacion {id}"))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn clear_repairs(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM reparaciones")
            .execute(&self.pool)
            .await
            .context("failed to clear reparaciones")?;
        Ok(result.rows_affected())
    }
}

async fn insert_row<'e, E>(executor: E, fields: &RepairFields) -> Result<RepairRecord>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(&format!(
        "INSERT INTO reparaciones (modelo, duenio, sintoma, observacion, tratamiento, estado, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)
         RETURNING {REPAIR_COLUMNS}"
    ))
    .bind(&fields.modelo)
    .bind(&fields.duenio)
    .bind(&fields.sintoma)
    .bind(&fields.observacion)
    .bind(&fields.tratamiento)
    .bind(fields.estado.as_str())
    .bind(Utc::now())
    .fetch_one(executor)
    .await
    .context("failed to insert reparacion")?;
    let record = repair_from_row(&row)?;
    debug!(id = record.id.0, "inserted reparacion");
    Ok(record)
}

fn repair_from_row(row: &SqliteRow) -> Result<RepairRecord> {
    let estado: String = row.try_get("estado")?;
    let estado = Estado::from_str(&estado)?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    Ok(RepairRecord {
        id: RepairId(row.try_get("id")?),
        modelo: row.try_get("modelo")?,
        duenio: row.try_get("duenio")?,
        sintoma: row.try_get("sintoma")?,
        observacion: row
            .try_get::<Option<String>, _>("observacion")?
            .unwrap_or_default(),
        tratamiento: row
            .try_get::<Option<String>, _>("tratamiento")?
            .unwrap_or_default(),
        estado,
        created_at,
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
    if database_url.contains(":memory:") || !database_url.starts_with("sqlite:") {
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
