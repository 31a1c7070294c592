use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::Finding;

/// Body of `POST /scan`, shared by the service and the submission client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ScanStarted {
    pub scan_id: String,
}

/// A finding as pushed on the results feed.
#[derive(Debug, Serialize)]
pub struct FeedItem {
    pub vuln_id: String,
    pub scan_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: String,
    pub details: Value,
    pub timestamp: f64,
}

impl From<Finding> for FeedItem {
    fn from(finding: Finding) -> Self {
        // Details are stored as JSON text; fall back to the raw string.
        let details = serde_json::from_str(&finding.details)
            .unwrap_or(Value::String(finding.details));
        FeedItem {
            vuln_id: finding.vuln_id,
            scan_id: finding.scan_id,
            kind: finding.kind,
            severity: finding.severity,
            details,
            timestamp: finding.timestamp,
        }
    }
}
