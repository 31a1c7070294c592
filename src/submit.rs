//! Scan form submission.
//!
//! A submission suppresses the form's default action, posts the target URL to
//! `/scan` and sends the page to `/results/<scan_id>`. Every failure along the
//! way ends in the same alert.

pub mod client;

use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tracing::debug;

pub use client::{ScanClient, ScanRequest};

/// Alert shown when a scan could not be started.
pub const SCAN_START_FAILED: &str = "حدث خطأ أثناء بدء الفحص";

const RESULTS_PREFIX: &str = "/results/";

/// Internal failure kinds. All of them surface as [`SCAN_START_FAILED`].
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Request to scan service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Scan service replied with invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Scan service replied with null")]
    NullResponse,
}

impl SubmitError {
    pub fn user_message(&self) -> &'static str {
        SCAN_START_FAILED
    }
}

/// A form submission event.
#[derive(Debug, Default)]
pub struct SubmitEvent {
    default_prevented: AtomicBool,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&self) {
        self.default_prevented.store(true, Ordering::SeqCst);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.load(Ordering::SeqCst)
    }
}

/// The page hosting the scan form.
pub trait Page: Send + Sync {
    /// Current value of the target URL field.
    fn target_url(&self) -> String;

    fn navigate(&self, path: &str);

    fn alert(&self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Navigated(String),
    Alerted,
}

/// Handles submissions of the scan form. Submissions are independent: nothing
/// stops a second one from starting while the first is still in flight.
#[derive(Debug, Clone)]
pub struct SubmissionHandler {
    client: ScanClient,
}

impl SubmissionHandler {
    pub fn new(client: ScanClient) -> Self {
        SubmissionHandler { client }
    }

    pub async fn on_submit<P: Page + ?Sized>(&self, event: &SubmitEvent, page: &P) -> SubmitOutcome {
        event.prevent_default();

        let request = ScanRequest {
            url: page.target_url(),
        };

        match self.initiate(&request).await {
            Ok(path) => {
                page.navigate(&path);
                SubmitOutcome::Navigated(path)
            }
            Err(e) => {
                debug!(error = %e, url = %request.url, "Scan initiation failed");
                page.alert(e.user_message());
                SubmitOutcome::Alerted
            }
        }
    }

    async fn initiate(&self, request: &ScanRequest) -> Result<String, SubmitError> {
        let body = self.client.start_scan(request).await?;
        results_path(&body)
    }
}

/// Builds the navigation target from a decoded `/scan` reply.
///
/// `scan_id` is interpolated the way a template literal would render it, so a
/// missing field becomes `undefined` rather than an error. Only a `null` body
/// fails, since there is no object to read the field from.
pub fn results_path(body: &Value) -> Result<String, SubmitError> {
    let scan_id = match body {
        Value::Null => return Err(SubmitError::NullResponse),
        Value::Object(fields) => match fields.get("scan_id") {
            Some(value) => render(value),
            None => "undefined".to_string(),
        },
        _ => "undefined".to_string(),
    };
    Ok(format!("{}{}", RESULTS_PREFIX, scan_id))
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.as_f64().map(number_to_string).unwrap_or_default(),
        // Array joins render holes and nulls as empty strings.
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => render(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Number-to-string conversion of a double: integers beyond 2^53 lose
/// precision, `-0` prints as `0`, and magnitudes outside `[1e-6, 1e21)` use
/// exponent form with an explicit sign.
fn number_to_string(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    let magnitude = f.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let exp = format!("{:e}", f);
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
            _ => exp,
        }
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_id_is_appended() {
        assert_eq!(results_path(&json!({"scan_id": "abc123"})).unwrap(), "/results/abc123");
    }

    #[test]
    fn empty_id_is_not_special_cased() {
        assert_eq!(results_path(&json!({"scan_id": ""})).unwrap(), "/results/");
    }

    #[test]
    fn missing_id_renders_undefined() {
        assert_eq!(results_path(&json!({"status": "ok"})).unwrap(), "/results/undefined");
        assert_eq!(results_path(&json!([1, 2])).unwrap(), "/results/undefined");
        assert_eq!(results_path(&json!("abc")).unwrap(), "/results/undefined");
    }

    #[test]
    fn null_body_fails() {
        assert!(matches!(results_path(&Value::Null), Err(SubmitError::NullResponse)));
    }

    #[test]
    fn non_string_ids_render_like_template_literals() {
        let cases = [
            (json!(42), "42"),
            (json!(4.5), "4.5"),
            (json!(true), "true"),
            (json!(null), "null"),
            (json!([1, "a", null]), "1,a,"),
            (json!({"a": 1}), "[object Object]"),
            (json!(1e21), "1e+21"),
            (json!(1.5e22), "1.5e+22"),
            (json!(1e-7), "1e-7"),
            (json!(-2.5e-8), "-2.5e-8"),
            (json!(1e20), "100000000000000000000"),
            (json!(0.000001), "0.000001"),
            (json!(-0.0), "0"),
            (json!(-7), "-7"),
            (json!(9007199254740993u64), "9007199254740992"),
        ];
        for (id, expected) in cases {
            let path = results_path(&json!({ "scan_id": id })).unwrap();
            assert_eq!(path, format!("/results/{}", expected));
        }
    }

    #[test]
    fn every_failure_shares_one_message() {
        let invalid = serde_json::from_str::<Value>("<html>").unwrap_err();
        assert_eq!(SubmitError::InvalidJson(invalid).user_message(), SCAN_START_FAILED);
        assert_eq!(SubmitError::NullResponse.user_message(), SCAN_START_FAILED);
    }

    #[test]
    fn prevent_default_sticks() {
        let event = SubmitEvent::new();
        assert!(!event.default_prevented());
        event.prevent_default();
        assert!(event.default_prevented());
    }
}
