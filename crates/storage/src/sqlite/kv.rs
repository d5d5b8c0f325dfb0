use chrono::Utc;
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::repository::StorageError;

use super::mapping::{conn, ser};

pub(crate) async fn get(pool: &SqlitePool, key: &str) -> Result<Option<String>, StorageError> {
    let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?1")
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(conn)?;

    row.map(|row| row.try_get::<String, _>("value").map_err(ser))
        .transpose()
}

/// All `(key, value)` pairs whose key starts with `prefix`.
pub(crate) async fn scan_prefix(
    pool: &SqlitePool,
    prefix: &str,
) -> Result<Vec<(String, String)>, StorageError> {
    let rows = sqlx::query("SELECT key, value FROM kv_store WHERE substr(key, 1, ?1) = ?2")
        .bind(i64::try_from(prefix.len()).map_err(ser)?)
        .bind(prefix)
        .fetch_all(pool)
        .await
        .map_err(conn)?;

    rows.iter()
        .map(|row| {
            Ok((
                row.try_get::<String, _>("key").map_err(ser)?,
                row.try_get::<String, _>("value").map_err(ser)?,
            ))
        })
        .collect()
}

pub(crate) async fn put(
    conn_ref: &mut SqliteConnection,
    key: &str,
    value: &str,
) -> Result<(), StorageError> {
    sqlx::query(
        r"
        INSERT INTO kv_store (key, value, updated_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
        ",
    )
    .bind(key)
    .bind(value)
    .bind(Utc::now())
    .execute(conn_ref)
    .await
    .map_err(conn)?;
    Ok(())
}

pub(crate) async fn put_if_absent(
    conn_ref: &mut SqliteConnection,
    key: &str,
    value: &str,
) -> Result<(), StorageError> {
    sqlx::query(
        r"
        INSERT INTO kv_store (key, value, updated_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(key) DO NOTHING
        ",
    )
    .bind(key)
    .bind(value)
    .bind(Utc::now())
    .execute(conn_ref)
    .await
    .map_err(conn)?;
    Ok(())
}
