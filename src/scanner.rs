use std::time::Duration;

use chrono::Utc;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::{error, info, instrument};

use crate::db::{self, Finding};
use crate::error::Result;

/// Length of scan and finding identifiers, in hex characters.
const ID_LEN: usize = 12;

/// Findings reported by the simulated probe, in the order they are recorded.
const SIMULATED_FINDINGS: [(&str, &str, &str); 2] = [
    ("SQLi", "High", "Found SQL injection vulnerability"),
    ("XSS", "Medium", "Possible XSS detected"),
];

pub struct Scanner {
    pool: SqlitePool,
    url: String,
    scan_id: String,
    step_delay: Duration,
}

impl Scanner {
    /// Registers a new scan for `url` as `running` and returns its handle.
    pub async fn start(pool: SqlitePool, url: &str, step_delay: Duration) -> Result<Self> {
        let started_at = unix_now();
        let scan_id = short_digest(&format!("{}{}", url, started_at));
        db::insert_scan(&pool, &scan_id, url, started_at).await?;
        info!(scan_id = %scan_id, url = %url, "Scan registered");

        Ok(Scanner {
            pool,
            url: url.to_string(),
            scan_id,
            step_delay,
        })
    }

    pub fn scan_id(&self) -> &str {
        &self.scan_id
    }

    /// Runs the probe to completion and records the final status.
    #[instrument(skip(self), fields(scan_id = %self.scan_id, url = %self.url))]
    pub async fn run(self) {
        let status = match self.probe().await {
            Ok(()) => "completed",
            Err(e) => {
                error!(error = %e, "Scan aborted");
                "failed"
            }
        };

        if let Err(e) = db::finish_scan(&self.pool, &self.scan_id, status, unix_now()).await {
            error!(error = %e, "Failed to record scan status");
            return;
        }
        info!(status, "Scan finished");
    }

    async fn probe(&self) -> Result<()> {
        for (kind, severity, details) in SIMULATED_FINDINGS {
            let finding = Finding {
                vuln_id: short_digest(&format!("{}{}", self.scan_id, kind)),
                scan_id: self.scan_id.clone(),
                kind: kind.to_string(),
                severity: severity.to_string(),
                details: serde_json::Value::from(details).to_string(),
                timestamp: unix_now(),
            };
            db::insert_vulnerability(&self.pool, &finding).await?;
            info!(kind, severity, "Finding recorded");
            tokio::time::sleep(self.step_delay).await;
        }
        Ok(())
    }
}

/// First twelve hex characters of the SHA-256 of `input`.
pub fn short_digest(input: &str) -> String {
    let hash = Sha256::digest(input.as_bytes());
    let mut hex = format!("{:x}", hash);
    hex.truncate(ID_LEN);
    hex
}

fn unix_now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_digest_is_twelve_hex_chars() {
        // sha256("abc") = ba7816bf8f01cfea...
        assert_eq!(short_digest("abc"), "ba7816bf8f01");
        let id = short_digest("http://example.com1700000000.5");
        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn run_records_findings_then_completes() {
        let pool = db::memory_pool().await.unwrap();
        let scanner = Scanner::start(pool.clone(), "http://example.com", Duration::ZERO)
            .await
            .unwrap();
        let scan_id = scanner.scan_id().to_string();

        let record = db::find_scan(&pool, &scan_id).await.unwrap().unwrap();
        assert_eq!(record.status, "running");
        assert_eq!(record.url, "http://example.com");

        scanner.run().await;

        let record = db::find_scan(&pool, &scan_id).await.unwrap().unwrap();
        assert_eq!(record.status, "completed");
        assert!(record.end_time.is_some());

        let findings = db::vulnerabilities_for(&pool, &scan_id).await.unwrap();
        let summary: Vec<_> = findings
            .iter()
            .map(|f| (f.kind.as_str(), f.severity.as_str()))
            .collect();
        assert_eq!(summary, vec![("SQLi", "High"), ("XSS", "Medium")]);
        assert_eq!(findings[0].vuln_id, short_digest(&format!("{}SQLi", scan_id)));
        assert_eq!(findings[0].details, "\"Found SQL injection vulnerability\"");
    }
}
