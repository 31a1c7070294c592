//! SQLite storage for scans and their findings.

use std::str::FromStr;

use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ScanRecord {
    pub scan_id: String,
    pub url: String,
    pub status: String,
    pub start_time: f64,
    pub end_time: Option<f64>,
}

/// One row of the `vulnerabilities` table, as sent on the results feed.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Finding {
    pub vuln_id: String,
    pub scan_id: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub severity: String,
    pub details: String,
    pub timestamp: f64,
}

pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    init_schema(&pool).await?;
    Ok(pool)
}

pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "
        CREATE TABLE IF NOT EXISTS scans (
            scan_id TEXT PRIMARY KEY,
            url TEXT,
            status TEXT,
            start_time REAL,
            end_time REAL
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "
        CREATE TABLE IF NOT EXISTS vulnerabilities (
            vuln_id TEXT PRIMARY KEY,
            scan_id TEXT,
            type TEXT,
            severity TEXT,
            details TEXT,
            timestamp REAL,
            FOREIGN KEY(scan_id) REFERENCES scans(scan_id)
        )
        ",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn insert_scan(pool: &SqlitePool, scan_id: &str, url: &str, start_time: f64) -> Result<()> {
    sqlx::query("INSERT INTO scans (scan_id, url, status, start_time, end_time) VALUES (?, ?, 'running', ?, NULL)")
        .bind(scan_id)
        .bind(url)
        .bind(start_time)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn finish_scan(pool: &SqlitePool, scan_id: &str, status: &str, end_time: f64) -> Result<()> {
    sqlx::query("UPDATE scans SET status = ?, end_time = ? WHERE scan_id = ?")
        .bind(status)
        .bind(end_time)
        .bind(scan_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn find_scan(pool: &SqlitePool, scan_id: &str) -> Result<Option<ScanRecord>> {
    let record = sqlx::query_as::<_, ScanRecord>(
        "SELECT scan_id, url, status, start_time, end_time FROM scans WHERE scan_id = ?",
    )
    .bind(scan_id)
    .fetch_optional(pool)
    .await?;
    Ok(record)
}

pub async fn insert_vulnerability(pool: &SqlitePool, finding: &Finding) -> Result<()> {
    sqlx::query(
        "INSERT INTO vulnerabilities (vuln_id, scan_id, type, severity, details, timestamp) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&finding.vuln_id)
    .bind(&finding.scan_id)
    .bind(&finding.kind)
    .bind(&finding.severity)
    .bind(&finding.details)
    .bind(finding.timestamp)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn vulnerabilities_for(pool: &SqlitePool, scan_id: &str) -> Result<Vec<Finding>> {
    let rows = sqlx::query_as::<_, Finding>(
        "
        SELECT vuln_id, scan_id, type, severity, details, timestamp
        FROM vulnerabilities
        WHERE scan_id = ?
        ORDER BY timestamp ASC, rowid ASC
        ",
    )
    .bind(scan_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fresh in-memory database with the schema applied. Test helper for unit
/// and integration tests; the service itself always goes through [`connect`].
///
/// Every connection to `sqlite::memory:` is its own database, so the pool
/// must never open a second one.
pub async fn memory_pool() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .connect("sqlite::memory:")
        .await?;
    init_schema(&pool).await?;
    Ok(pool)
}
